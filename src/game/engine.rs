//! Game loop: owns both agents and the append-only record log

use std::sync::Arc;

use tracing::info;

use super::prompts;
use super::round::{available_modes, RoundController};
use crate::config::{GameConfig, RegulationConfig};
use crate::domain::{Agent, AgentRole, BusinessMode, RoundRecord};
use crate::error::{GameError, Result};
use crate::oracle::DecisionOracle;

/// Repeated platform/seller game
pub struct PlatformGame {
    config: GameConfig,
    regulation: RegulationConfig,
    oracle: Arc<dyn DecisionOracle>,
    platform: Agent,
    seller: Agent,
    records: Vec<RoundRecord>,
}

impl PlatformGame {
    /// Create a game; rejects invalid model parameters before any round runs
    pub fn new(
        game_setting: &str,
        config: GameConfig,
        regulation: RegulationConfig,
        oracle: Arc<dyn DecisionOracle>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|errors| GameError::InvalidConfig(errors.join("; ")))?;

        Ok(Self {
            config,
            regulation,
            oracle,
            platform: Agent::new(
                prompts::PLATFORM_NAME,
                AgentRole::Platform,
                prompts::PLATFORM_ROLE,
                game_setting,
            ),
            seller: Agent::new(
                prompts::SELLER_NAME,
                AgentRole::Seller,
                prompts::SELLER_ROLE,
                game_setting,
            ),
            records: Vec::new(),
        })
    }

    /// Create a game with the default rules narrative
    pub fn with_default_setting(
        config: GameConfig,
        regulation: RegulationConfig,
        oracle: Arc<dyn DecisionOracle>,
    ) -> Result<Self> {
        Self::new(prompts::DEFAULT_GAME_SETTING, config, regulation, oracle)
    }

    /// Play `rounds` more rounds; round ids continue from the log
    pub async fn run(&mut self, rounds: u32) -> Result<&[RoundRecord]> {
        if rounds < 1 {
            return Err(GameError::InvalidConfig(
                "rounds must be at least 1".to_string(),
            ));
        }

        let first = self.records.len() as u32 + 1;
        for round in first..first + rounds {
            info!("--- Round {} ---", round);
            self.play_round(round).await?;
        }

        info!(
            "Game finished after {} rounds: {} | {}",
            self.records.len(),
            self.platform.status(),
            self.seller.status()
        );
        Ok(&self.records)
    }

    async fn play_round(&mut self, round: u32) -> Result<()> {
        let controller = RoundController::new(&self.config, &self.regulation, self.oracle.as_ref());
        let record = controller
            .play(round, &mut self.platform, &mut self.seller)
            .await?;
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    /// Consume the game, keeping only the record log
    pub fn into_records(self) -> Vec<RoundRecord> {
        self.records
    }

    pub fn platform(&self) -> &Agent {
        &self.platform
    }

    pub fn seller(&self) -> &Agent {
        &self.seller
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn regulation(&self) -> &RegulationConfig {
        &self.regulation
    }

    pub fn available_modes(&self) -> Vec<BusinessMode> {
        available_modes(&self.regulation)
    }
}
