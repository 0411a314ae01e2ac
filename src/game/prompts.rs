//! Prompt texts for each stage, the default game setting, and the round summary

use crate::config::GameConfig;
use crate::domain::{BusinessMode, RoundDecision, Settlement};

pub const PLATFORM_NAME: &str = "Amazonia";
pub const SELLER_NAME: &str = "StartUpInc";

pub const PLATFORM_ROLE: &str = "You are the Platform M. You choose the business mode, set commissions, and may self-preference or imitate the seller's product.";
pub const SELLER_ROLE: &str = "You are the Innovative Seller S. You invest in innovation and set on-platform and direct prices.";

/// Narrative rules handed to both agents at construction
pub const DEFAULT_GAME_SETTING: &str = r#"Welcome to the "Platform Dual Mode Game".

The Scenario:
1. Roles:
   - Player M is a digital Platform. It runs a marketplace and may also sell its own product (Dual Mode).
   - Player S is a third-party Seller. It sells an innovative product on M's marketplace and through its own direct channel.

2. Products & Value:
   - Fringe sellers sell a basic product with value V=100.
   - Platform M sells a product with value V_M = 100 + 5 (platform advantage) + 10 (convenience).
   - Seller S sells a product with value V_S = 100 + Delta (innovation) + 10 (convenience) on the platform, without the convenience off it.
   - S determines 'Delta' by investing money. The cost of innovation grows quadratically.

3. Decisions:
   - Stage 0 (M): Choose the business mode: dual, marketplace or seller.
   - Stage 1 (M): Set the commission taken from S's on-platform revenue.
   - Stage 2 (S): Decide the innovation level. M may then imitate it in dual mode.
   - Stage 3 (Both): Set prices.
   - Stage 4 (M): Decide how many consumers get to see S's listing.

4. Goal: Maximize your own accumulated profit over the rounds.
   - M's Profit = (P_M * Sales_M) + (Commission * P_S * Sales_S).
   - S's Profit = (P_S * (1 - Commission) * Sales_S) + (P_S_direct * Sales_S_direct) - Innovation_Cost.

5. Competition: Consumers strictly prefer the product that offers the highest utility (Value - Price), and buy nothing when no option beats their outside option.
"#;

/// Wrap a stage prompt with the round header and context line
pub fn frame(round: u32, context: &str, decision_prompt: &str) -> String {
    format!("Round {round}. {context}\n{decision_prompt}")
}

pub fn mode_context(allowed: &[BusinessMode], status: &str) -> String {
    let labels: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
    format!("Available modes: {}. {}", labels.join(", "), status)
}

pub fn mode_prompt(allowed: &[BusinessMode]) -> String {
    let labels: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
    format!(
        "Select your business mode for this product category. Reply with 'Mode: {}' and justify.",
        labels.join("/")
    )
}

pub fn fee_prompt(cfg: &GameConfig) -> String {
    format!(
        "Stage 1 (fee). Choose a commission τ between 0 and the convenience benefit b={}. \
         Remember τ>b induces showrooming and zero platform revenue. Output 'Commission: value'.",
        cfg.convenience
    )
}

pub fn innovation_prompt(cfg: &GameConfig, commission: f64) -> String {
    format!(
        "Stage 2. Set your innovation Δ (≥ {}, ≤ {}). Innovation raises the value v+Δ on/off platform \
         but costs K(Δ)={}*(Δ-{})^2. Current commission τ={:.2}. Reply 'Innovation: value'.",
        cfg.min_innovation, cfg.max_innovation, cfg.innovation_cost_scale, cfg.min_innovation, commission
    )
}

pub fn imitation_prompt() -> &'static str {
    "Stage 2b. You may copy S's product since Δ>σ. State 'Imitate: yes/no' and explain how this affects your later pricing."
}

pub fn platform_price_prompt(limit: f64) -> String {
    format!(
        "Stage 3 pricing. Set your product price P_M (≤ {limit:.2}) given fringe competition \
         and any imitation decision. Output 'Price: value'."
    )
}

pub fn seller_price_prompt() -> &'static str {
    "Stage 3 pricing. Provide both the on-platform price and direct (off-platform) price. \
     Respect the upper bound pi ≤ τ + Δ and po ≤ pi - b. Format: 'PlatformPrice: x, DirectPrice: y'."
}

pub fn display_prompt() -> &'static str {
    "Stage 4. Decide the share of consumers that you let observe S (0=hide completely, 1=show always). \
     This captures self-preferencing/steering. Format 'DisplayShare: value between 0 and 1'."
}

/// Human-readable outcome appended to both agents' histories
pub fn round_summary(round: u32, decision: &RoundDecision, outcome: &Settlement) -> String {
    format!(
        "Round {} result:\n\
         Mode={}, τ={:.2}, Δ={:.1}, imitation={}, show={:.2}\n\
         P_M={:.2}, P_S^in={:.2}, P_S^out={:.2}\n\
         Sales -> M={:.0}, S_on={:.0}, S_off={:.0}\n\
         Profits -> Π_M={:.2}, π_S={:.2}",
        round,
        decision.mode,
        decision.commission,
        decision.innovation,
        if decision.imitation { "yes" } else { "no" },
        decision.display_bias,
        decision.price_m,
        decision.price_s_platform,
        decision.price_s_direct,
        outcome.sales_m,
        outcome.sales_s_platform,
        outcome.sales_s_direct,
        outcome.profit_m,
        outcome.profit_s,
    )
}
