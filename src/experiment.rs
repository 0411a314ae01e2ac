//! Regulation scenarios: run one fresh game per scenario and compare outcomes

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::{GameConfig, RegulationConfig};
use crate::domain::{BusinessMode, RoundRecord};
use crate::error::{GameError, Result};
use crate::game::PlatformGame;
use crate::oracle::DecisionOracle;

/// Scenario labels run when none are requested
pub const DEFAULT_SCENARIOS: [&str; 3] = ["baseline", "ban_self_pref", "ban_dual_mode"];

/// Known scenario labels, in display order
pub const SCENARIO_LABELS: [&str; 5] = [
    "baseline",
    "ban_self_pref",
    "ban_dual_mode",
    "ban_imitation",
    "ban_all",
];

/// Regulation preset for a scenario label
pub fn scenario(label: &str) -> Option<RegulationConfig> {
    let none = RegulationConfig::default();
    match label {
        "baseline" => Some(none),
        "ban_self_pref" => Some(RegulationConfig {
            ban_self_preferencing: true,
            ..none
        }),
        "ban_dual_mode" => Some(RegulationConfig {
            ban_dual_mode: true,
            ..none
        }),
        "ban_imitation" => Some(RegulationConfig {
            ban_imitation: true,
            ..none
        }),
        "ban_all" => Some(RegulationConfig {
            ban_dual_mode: true,
            ban_imitation: true,
            ban_self_preferencing: true,
        }),
        _ => None,
    }
}

/// Split a comma-separated list and check every label is known
pub fn parse_scenarios(list: &str) -> Result<Vec<String>> {
    let labels: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(unknown) = labels.iter().find(|l| scenario(l).is_none()) {
        return Err(GameError::InvalidConfig(format!(
            "Unknown scenario '{}'. Available keys: {}",
            unknown,
            SCENARIO_LABELS.join(", ")
        )));
    }
    if labels.is_empty() {
        return Err(GameError::InvalidConfig("no scenarios selected".to_string()));
    }
    Ok(labels)
}

/// A round record tagged with its scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario: String,
    #[serde(flatten)]
    pub record: RoundRecord,
}

/// Aggregate view of one scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub rounds: usize,
    pub total_profit_m: f64,
    pub total_profit_s: f64,
    pub mean_innovation: f64,
    pub mode_counts: BTreeMap<BusinessMode, usize>,
}

impl ScenarioSummary {
    pub fn from_records(scenario: &str, records: &[RoundRecord]) -> Self {
        let mut mode_counts = BTreeMap::new();
        for r in records {
            *mode_counts.entry(r.mode).or_insert(0) += 1;
        }
        let rounds = records.len();
        let mean_innovation = if rounds > 0 {
            records.iter().map(|r| r.innovation).sum::<f64>() / rounds as f64
        } else {
            0.0
        };

        Self {
            scenario: scenario.to_string(),
            rounds,
            total_profit_m: records.iter().map(|r| r.profit_m).sum(),
            total_profit_s: records.iter().map(|r| r.profit_s).sum(),
            mean_innovation,
            mode_counts,
        }
    }
}

/// Run every scenario in `labels` with a fresh game of `rounds` rounds.
///
/// `make_oracle` is called once per scenario so scripted oracles can start
/// from a clean script each time.
pub async fn run_scenarios<F>(
    labels: &[String],
    rounds: u32,
    config: GameConfig,
    game_setting: &str,
    mut make_oracle: F,
) -> Result<Vec<ScenarioRecord>>
where
    F: FnMut(&str) -> Result<Arc<dyn DecisionOracle>>,
{
    let mut all = Vec::new();

    for label in labels {
        let regulation = scenario(label).ok_or_else(|| {
            GameError::InvalidConfig(format!("Unknown scenario '{}'", label))
        })?;
        info!("=== Scenario {} ({:?}) ===", label, regulation);

        let mut game = PlatformGame::new(game_setting, config, regulation, make_oracle(label)?)?;
        game.run(rounds).await?;

        all.extend(game.into_records().into_iter().map(|record| ScenarioRecord {
            scenario: label.clone(),
            record,
        }));
    }

    Ok(all)
}

/// Summaries per scenario, in first-seen order
pub fn summarize(records: &[ScenarioRecord]) -> Vec<ScenarioSummary> {
    let mut order: Vec<&str> = Vec::new();
    for r in records {
        if !order.contains(&r.scenario.as_str()) {
            order.push(&r.scenario);
        }
    }

    order
        .into_iter()
        .map(|label| {
            let subset: Vec<RoundRecord> = records
                .iter()
                .filter(|r| r.scenario == label)
                .map(|r| r.record.clone())
                .collect();
            ScenarioSummary::from_records(label, &subset)
        })
        .collect()
}

/// Write records as pretty JSON, creating parent directories
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, &json)
        .with_context(|| format!("writing records to {}", path.display()))?;
    info!("Saved {} bytes to {}", json.len(), path.display());
    Ok(())
}
