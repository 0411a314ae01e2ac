//! Round controller: runs the stage protocol for one round.
//!
//! Stages run strictly in order because later bounds depend on earlier
//! answers (price caps use the commission and the innovation level). A stage
//! that does not apply to the chosen mode or regulation is skipped without a
//! prompt and its field takes a fixed value.

use tracing::{debug, info};

use super::extract::{clip, extract_choice, extract_mode, extract_number};
use super::prompts;
use super::settlement::settle;
use crate::config::{GameConfig, RegulationConfig};
use crate::domain::{Agent, BusinessMode, ChatMessage, RoundDecision, RoundRecord, Stage};
use crate::error::Result;
use crate::oracle::DecisionOracle;

/// Modes the platform may choose under `regulation`, in prompt order
pub fn available_modes(regulation: &RegulationConfig) -> Vec<BusinessMode> {
    BusinessMode::ALL
        .into_iter()
        .filter(|m| !(regulation.ban_dual_mode && *m == BusinessMode::Dual))
        .collect()
}

/// Drives one round between a platform and a seller agent
pub struct RoundController<'a> {
    config: &'a GameConfig,
    regulation: &'a RegulationConfig,
    oracle: &'a dyn DecisionOracle,
}

impl<'a> RoundController<'a> {
    pub fn new(
        config: &'a GameConfig,
        regulation: &'a RegulationConfig,
        oracle: &'a dyn DecisionOracle,
    ) -> Self {
        Self {
            config,
            regulation,
            oracle,
        }
    }

    /// Run every stage, settle, update both agents, and return the record
    pub async fn play(
        &self,
        round: u32,
        platform: &mut Agent,
        seller: &mut Agent,
    ) -> Result<RoundRecord> {
        let allowed = available_modes(self.regulation);
        let default_mode = allowed.first().copied().unwrap_or(BusinessMode::Marketplace);
        let mut decision = RoundDecision::new(default_mode, self.config.min_innovation);

        let mut stage = Stage::ModeSelection;
        while !stage.is_terminal() {
            if self.stage_applies(stage, &decision) {
                self.run_stage(stage, round, &mut decision, platform, seller)
                    .await?;
            } else {
                self.skip_stage(stage, &mut decision);
                debug!("Round {}: {} skipped for mode {}", round, stage, decision.mode);
            }
            stage = stage.next().unwrap_or(Stage::Settled);
        }

        let outcome = settle(&decision, self.config);
        platform.credit(outcome.profit_m);
        seller.credit(outcome.profit_s);

        let summary = prompts::round_summary(round, &decision, &outcome);
        info!("{}", summary);
        platform.push(ChatMessage::user(summary.clone()));
        seller.push(ChatMessage::user(summary));

        Ok(RoundRecord::new(round, &decision, &outcome))
    }

    /// Whether `stage` issues a prompt given the decisions so far
    pub fn stage_applies(&self, stage: Stage, decision: &RoundDecision) -> bool {
        let mode = decision.mode;
        match stage {
            Stage::ModeSelection | Stage::Innovation => true,
            Stage::Fee | Stage::SellerPricing => mode.hosts_seller(),
            Stage::Imitation => {
                mode == BusinessMode::Dual
                    && !self.regulation.ban_imitation
                    && decision.innovation > self.config.sigma
            }
            Stage::PlatformPricing => mode.sells_own_product(),
            Stage::DisplayBias => {
                mode == BusinessMode::Dual && !self.regulation.ban_self_preferencing
            }
            Stage::Settled => false,
        }
    }

    fn skip_stage(&self, stage: Stage, decision: &mut RoundDecision) {
        match stage {
            Stage::Fee => decision.commission = 0.0,
            Stage::Imitation => decision.imitation = false,
            Stage::PlatformPricing => decision.price_m = 0.0,
            Stage::SellerPricing => {
                decision.price_s_platform = 0.0;
                decision.price_s_direct = 0.0;
            }
            Stage::DisplayBias => {
                decision.display_bias = match decision.mode {
                    BusinessMode::Seller => 0.0,
                    // Marketplace, or dual with self-preferencing banned
                    BusinessMode::Marketplace | BusinessMode::Dual => 1.0,
                };
            }
            Stage::ModeSelection | Stage::Innovation | Stage::Settled => {}
        }
    }

    async fn select_mode(
        &self,
        round: u32,
        default: BusinessMode,
        platform: &mut Agent,
        seller: &Agent,
    ) -> Result<BusinessMode> {
        let allowed = available_modes(self.regulation);
        let status = format!("M: {} | S: {}", platform.status(), seller.status());
        let reply = self
            .ask(
                platform,
                round,
                &prompts::mode_context(&allowed, &status),
                &prompts::mode_prompt(&allowed),
            )
            .await?;

        let mode = extract_mode(&reply, &allowed, default);
        info!("Round {}: mode={}", round, mode);
        Ok(mode)
    }

    async fn run_stage(
        &self,
        stage: Stage,
        round: u32,
        decision: &mut RoundDecision,
        platform: &mut Agent,
        seller: &mut Agent,
    ) -> Result<()> {
        let cfg = self.config;

        match stage {
            Stage::ModeSelection => {
                decision.mode = self
                    .select_mode(round, decision.mode, platform, seller)
                    .await?;
            }
            Stage::Fee => {
                let reply = self
                    .ask(
                        platform,
                        round,
                        &format!("Mode={}", decision.mode),
                        &prompts::fee_prompt(cfg),
                    )
                    .await?;
                decision.commission = clip(
                    extract_number(&reply, "Commission", cfg.convenience),
                    0.0,
                    cfg.convenience,
                );
                info!("Round {}: commission={:.2}", round, decision.commission);
            }
            Stage::Innovation => {
                let status = format!("M: {} | S: {}", platform.status(), seller.status());
                let reply = self
                    .ask(
                        seller,
                        round,
                        &status,
                        &prompts::innovation_prompt(cfg, decision.commission),
                    )
                    .await?;
                decision.innovation = clip(
                    extract_number(&reply, "Innovation", cfg.min_innovation),
                    cfg.min_innovation,
                    cfg.max_innovation,
                );
                info!("Round {}: innovation={:.1}", round, decision.innovation);
            }
            Stage::Imitation => {
                let reply = self
                    .ask(
                        platform,
                        round,
                        &format!("Seller innovation={:.1}", decision.innovation),
                        prompts::imitation_prompt(),
                    )
                    .await?;
                decision.imitation = extract_choice(&reply, "Imitate", "imitate", false);
                info!("Round {}: imitation={}", round, decision.imitation);
            }
            Stage::PlatformPricing => {
                let edge = if decision.imitation {
                    decision.innovation
                } else {
                    cfg.sigma
                };
                let limit = cfg.convenience + edge;
                let reply = self
                    .ask(
                        platform,
                        round,
                        &format!("Mode={}, τ={:.2}", decision.mode, decision.commission),
                        &prompts::platform_price_prompt(limit),
                    )
                    .await?;
                decision.price_m = clip(extract_number(&reply, "Price", limit), 0.0, limit);
                info!("Round {}: price_M={:.2}", round, decision.price_m);
            }
            Stage::SellerPricing => {
                let reply = self
                    .ask(
                        seller,
                        round,
                        &format!("τ={:.2}, Δ={:.1}", decision.commission, decision.innovation),
                        prompts::seller_price_prompt(),
                    )
                    .await?;
                let on_limit = decision.commission + decision.innovation;
                decision.price_s_platform = clip(
                    extract_number(&reply, "PlatformPrice", on_limit),
                    0.0,
                    on_limit,
                );
                let on_price = decision.price_s_platform;
                let inferred_direct = (on_price - cfg.convenience).max(0.0);
                decision.price_s_direct = clip(
                    extract_number(&reply, "DirectPrice", inferred_direct),
                    0.0,
                    (on_price - cfg.convenience).max(on_price),
                );
                info!(
                    "Round {}: price_S_platform={:.2}, price_S_direct={:.2}",
                    round, decision.price_s_platform, decision.price_s_direct
                );
            }
            Stage::DisplayBias => {
                let reply = self
                    .ask(platform, round, "", prompts::display_prompt())
                    .await?;
                decision.display_bias = clip(extract_number(&reply, "DisplayShare", 1.0), 0.0, 1.0);
                info!("Round {}: display_share={:.2}", round, decision.display_bias);
            }
            Stage::Settled => {}
        }

        Ok(())
    }

    /// Append the prompt, ask the oracle, append the reply
    async fn ask(
        &self,
        agent: &mut Agent,
        round: u32,
        context: &str,
        decision_prompt: &str,
    ) -> Result<String> {
        let prompt = prompts::frame(round, context, decision_prompt);
        debug!("Asking {}: {}", agent.name(), prompt);
        agent.push(ChatMessage::user(prompt));

        let reply = self.oracle.generate(agent.history()).await?;
        debug!("{} response: {}", agent.name(), reply);
        agent.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AgentRole;
    use crate::oracle::ScriptedOracle;

    fn agents() -> (Agent, Agent) {
        (
            Agent::new("M", AgentRole::Platform, prompts::PLATFORM_ROLE, "rules"),
            Agent::new("S", AgentRole::Seller, prompts::SELLER_ROLE, "rules"),
        )
    }

    #[test]
    fn test_available_modes() {
        assert_eq!(
            available_modes(&RegulationConfig::default()),
            BusinessMode::ALL.to_vec()
        );
        let banned = RegulationConfig {
            ban_dual_mode: true,
            ..RegulationConfig::default()
        };
        assert_eq!(
            available_modes(&banned),
            vec![BusinessMode::Marketplace, BusinessMode::Seller]
        );
    }

    #[tokio::test]
    async fn test_dual_round_prompts_every_stage() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();
        let oracle = ScriptedOracle::new([
            "Mode: dual",
            "Commission: 5",
            "Innovation: 20",
            "Imitate: yes",
            "Price: 15",
            "PlatformPrice: 10, DirectPrice: 5",
            "DisplayShare: 1",
        ]);
        let (mut m, mut s) = agents();

        let record = RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        assert_eq!(oracle.call_count(), 7);
        assert_eq!(record.mode, BusinessMode::Dual);
        assert_eq!(record.commission, 5.0);
        assert_eq!(record.innovation, 20.0);
        assert!(record.imitation);
        assert_eq!(record.price_m, 15.0);
        assert_eq!(record.price_s_platform, 10.0);
        assert_eq!(record.price_s_direct, 5.0);
        assert_eq!(record.sales_s_platform, 1000.0);
        assert_eq!(record.sales_m, 0.0);
        assert_eq!(m.balance(), record.profit_m);
        assert_eq!(s.balance(), record.profit_s);
    }

    #[tokio::test]
    async fn test_seller_mode_skips_fee_and_seller_pricing() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();
        let oracle = ScriptedOracle::new(["Mode: seller", "Innovation: 5", "Price: 12"]);
        let (mut m, mut s) = agents();

        let record = RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        assert_eq!(oracle.call_count(), 3);
        assert_eq!(record.commission, 0.0);
        assert_eq!(record.display_share, 0.0);
        assert_eq!(record.price_s_platform, 0.0);
        assert_eq!(record.price_s_direct, 0.0);
        assert_eq!(record.price_m, 12.0);
        assert_eq!(record.profit_s, 0.0);
    }

    #[tokio::test]
    async fn test_out_of_range_answers_are_clipped() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();
        let oracle = ScriptedOracle::new([
            "Mode: marketplace",
            "Commission: 50",
            "Innovation: 500",
            "PlatformPrice: 1000, DirectPrice: -4",
        ]);
        let (mut m, mut s) = agents();

        let record = RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        assert_eq!(record.commission, cfg.convenience);
        assert_eq!(record.innovation, cfg.max_innovation);
        assert_eq!(record.price_s_platform, cfg.convenience + cfg.max_innovation);
        assert_eq!(record.price_s_direct, 0.0);
        assert_eq!(record.price_m, 0.0);
        assert!(!record.imitation);
        assert_eq!(record.display_share, 1.0);
    }

    #[tokio::test]
    async fn test_platform_price_cap_follows_imitation() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();

        for (imitate, cap) in [("yes", 50.0), ("no", 15.0)] {
            let oracle = ScriptedOracle::new([
                "Mode: dual".to_string(),
                "Commission: 5".to_string(),
                "Innovation: 40".to_string(),
                format!("Imitate: {}", imitate),
                "Price: 999".to_string(),
                "PlatformPrice: 20, DirectPrice: 10".to_string(),
                "DisplayShare: 7".to_string(),
            ]);
            let (mut m, mut s) = agents();

            let record = RoundController::new(&cfg, &reg, &oracle)
                .play(1, &mut m, &mut s)
                .await
                .unwrap();

            assert_eq!(record.mode, BusinessMode::Dual);
            assert_eq!(record.imitation, imitate == "yes");
            // b + Δ when imitating, b + σ otherwise
            assert_eq!(record.price_m, cap);
            assert_eq!(record.display_share, 1.0);
        }
    }

    #[tokio::test]
    async fn test_negative_display_share_clips_to_zero() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();
        let oracle = ScriptedOracle::new([
            "Mode: dual",
            "Commission: 5",
            "Innovation: 5",
            "Price: 40",
            "PlatformPrice: 8, DirectPrice: 1",
            "DisplayShare: -3",
        ]);
        let (mut m, mut s) = agents();

        let record = RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        // innovation not above sigma, so no imitation prompt
        assert_eq!(oracle.call_count(), 6);
        assert_eq!(record.display_share, 0.0);
        assert_eq!(record.price_m, cfg.convenience + cfg.sigma);
    }

    #[tokio::test]
    async fn test_direct_price_defaults_to_inferred_value() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();
        let oracle = ScriptedOracle::new([
            "Mode: marketplace",
            "Commission: 4",
            "Innovation: 30",
            "PlatformPrice: 25 and I will not sell directly",
        ]);
        let (mut m, mut s) = agents();

        let record = RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        assert_eq!(record.price_s_platform, 25.0);
        assert_eq!(record.price_s_direct, 15.0);
    }

    #[tokio::test]
    async fn test_low_innovation_skips_imitation() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();
        let oracle = ScriptedOracle::new([
            "Mode: dual",
            "Commission: 1",
            "Innovation: 5",
            "Price: 10",
            "PlatformPrice: 3, DirectPrice: 1",
            "DisplayShare: 0.5",
        ]);
        let (mut m, mut s) = agents();

        let record = RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        assert_eq!(oracle.call_count(), 6);
        assert!(!record.imitation);
        assert_eq!(record.price_m, 10.0);
        assert_eq!(record.display_share, 0.5);
        assert!(!oracle.prompts().iter().any(|p| p.contains("Imitate")));
    }

    #[tokio::test]
    async fn test_self_preferencing_ban_forces_full_visibility() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig {
            ban_self_preferencing: true,
            ban_imitation: true,
            ..RegulationConfig::default()
        };
        let oracle = ScriptedOracle::new([
            "Mode: dual",
            "Commission: 2",
            "Innovation: 40",
            "Price: 8",
            "PlatformPrice: 20, DirectPrice: 10",
        ]);
        let (mut m, mut s) = agents();

        let record = RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        assert_eq!(oracle.call_count(), 5);
        assert!(!record.imitation);
        assert_eq!(record.display_share, 1.0);
    }

    #[tokio::test]
    async fn test_history_records_prompts_replies_and_summary() {
        let cfg = GameConfig::default();
        let reg = RegulationConfig::default();
        let oracle = ScriptedOracle::new(["Mode: seller", "Innovation: 5", "Price: 12"]);
        let (mut m, mut s) = agents();

        RoundController::new(&cfg, &reg, &oracle)
            .play(1, &mut m, &mut s)
            .await
            .unwrap();

        // system + (mode, price) x (user, assistant) + summary
        assert_eq!(m.history().len(), 6);
        // system + innovation (user, assistant) + summary
        assert_eq!(s.history().len(), 4);
        assert!(m.history()[1].content.starts_with("Round 1. Available modes"));
        assert_eq!(m.history()[2].content, "Mode: seller");
        assert!(s.history()[3].content.starts_with("Round 1 result:"));
    }
}
