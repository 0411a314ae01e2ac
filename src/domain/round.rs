use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BusinessMode;

/// Decisions collected over one round, consumed by settlement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundDecision {
    pub mode: BusinessMode,
    /// Commission, within [0, convenience]
    pub commission: f64,
    /// Seller innovation, within [min_innovation, max_innovation]
    pub innovation: f64,
    pub imitation: bool,
    /// Platform's own product price
    pub price_m: f64,
    /// Seller price on the platform
    pub price_s_platform: f64,
    /// Seller price through its direct channel
    pub price_s_direct: f64,
    /// Share of consumers shown the seller, within [0, 1]
    pub display_bias: f64,
}

impl RoundDecision {
    /// Fresh decision for a round: every stage-controlled field at its skipped value
    pub fn new(mode: BusinessMode, min_innovation: f64) -> Self {
        Self {
            mode,
            commission: 0.0,
            innovation: min_innovation,
            imitation: false,
            price_m: 0.0,
            price_s_platform: 0.0,
            price_s_direct: 0.0,
            display_bias: 1.0,
        }
    }
}

/// Output of the settlement engine for one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub sales_m: f64,
    pub sales_s_platform: f64,
    pub sales_s_direct: f64,
    pub profit_m: f64,
    pub profit_s: f64,
    pub innovation_cost: f64,
}

/// Immutable snapshot of a settled round
///
/// Serializes to the flat key/value shape used for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub mode: BusinessMode,
    pub commission: f64,
    pub innovation: f64,
    pub imitation: bool,
    pub display_share: f64,
    #[serde(rename = "price_M")]
    pub price_m: f64,
    #[serde(rename = "price_S_platform")]
    pub price_s_platform: f64,
    #[serde(rename = "price_S_direct")]
    pub price_s_direct: f64,
    #[serde(rename = "profit_M")]
    pub profit_m: f64,
    #[serde(rename = "profit_S")]
    pub profit_s: f64,
    #[serde(rename = "sales_M")]
    pub sales_m: f64,
    #[serde(rename = "sales_S_platform")]
    pub sales_s_platform: f64,
    #[serde(rename = "sales_S_direct")]
    pub sales_s_direct: f64,
    pub innovation_cost: f64,
    pub settled_at: DateTime<Utc>,
}

impl RoundRecord {
    pub fn new(round: u32, decision: &RoundDecision, outcome: &Settlement) -> Self {
        Self {
            round,
            mode: decision.mode,
            commission: decision.commission,
            innovation: decision.innovation,
            imitation: decision.imitation,
            display_share: decision.display_bias,
            price_m: decision.price_m,
            price_s_platform: decision.price_s_platform,
            price_s_direct: decision.price_s_direct,
            profit_m: outcome.profit_m,
            profit_s: outcome.profit_s,
            sales_m: outcome.sales_m,
            sales_s_platform: outcome.sales_s_platform,
            sales_s_direct: outcome.sales_s_direct,
            innovation_cost: outcome.innovation_cost,
            settled_at: Utc::now(),
        }
    }
}
