//! Settlement engine: decisions in, sales and profits out.
//!
//! Consumers in a pool all buy the single best offer. Offers that are not on
//! sale under the chosen mode carry a net utility of `-inf`, so they can never
//! win and contribute nothing.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::domain::{BusinessMode, RoundDecision, Settlement};

/// A purchase option competing for a consumer pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketOption {
    /// Platform's own product
    Platform,
    /// Seller's product bought on the platform
    SellerOnPlatform,
    /// Seller's product bought through its direct channel
    SellerDirect,
    /// Basic fringe product, always worth zero net utility
    Fringe,
}

/// An option together with its net utility (value - price)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offer {
    pub option: MarketOption,
    pub net_utility: f64,
}

impl Offer {
    pub fn new(option: MarketOption, net_utility: f64) -> Self {
        Self {
            option,
            net_utility,
        }
    }

    pub fn fringe() -> Self {
        Self::new(MarketOption::Fringe, 0.0)
    }
}

/// Quantity bought by a pool and who got it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSale {
    pub winner: Option<MarketOption>,
    pub quantity: f64,
}

impl PoolSale {
    fn none() -> Self {
        Self {
            winner: None,
            quantity: 0.0,
        }
    }

    /// Units sold to `option` (zero unless it won)
    pub fn units(&self, option: MarketOption) -> f64 {
        if self.winner == Some(option) {
            self.quantity
        } else {
            0.0
        }
    }
}

/// Aware/unaware consumer split for a mode
///
/// Aware consumers see the seller's listing; unaware ones only see the platform.
pub fn consumer_shares(mode: BusinessMode, display_bias: f64) -> (f64, f64) {
    match mode {
        BusinessMode::Marketplace => (1.0, 0.0),
        BusinessMode::Seller => (0.0, 1.0),
        BusinessMode::Dual => (display_bias, 1.0 - display_bias),
    }
}

/// Linear outside-option CDF, capped to [0, 1]
pub fn outside_option_cdf(net_utility: f64, cfg: &GameConfig) -> f64 {
    (net_utility / cfg.outside_option_scale).clamp(0.0, 1.0)
}

/// Convex innovation cost `c * max(0, innovation - min_innovation)^2`
pub fn innovation_cost(innovation: f64, cfg: &GameConfig) -> f64 {
    let delta = (innovation - cfg.min_innovation).max(0.0);
    cfg.innovation_cost_scale * delta * delta
}

/// Winner-take-all allocation of one consumer pool.
///
/// The offer with the strictly highest net utility wins; on a tie the earlier
/// offer in `offers` keeps the pool. A non-positive best net utility means
/// nobody in the pool buys.
pub fn allocate_pool(offers: &[Offer], share: f64, cfg: &GameConfig) -> PoolSale {
    if share <= 0.0 {
        return PoolSale::none();
    }

    let mut best: Option<Offer> = None;
    for offer in offers {
        match best {
            Some(current) if offer.net_utility <= current.net_utility => {}
            _ => best = Some(*offer),
        }
    }

    let Some(best) = best else {
        return PoolSale::none();
    };
    if best.net_utility <= 0.0 {
        return PoolSale::none();
    }

    PoolSale {
        winner: Some(best.option),
        quantity: outside_option_cdf(best.net_utility, cfg) * share * f64::from(cfg.market_size),
    }
}

/// Settle one round
pub fn settle(decision: &RoundDecision, cfg: &GameConfig) -> Settlement {
    let mode = decision.mode;
    let platform_edge = if decision.imitation {
        decision.innovation
    } else {
        cfg.sigma
    };

    let value_m = cfg.base_value + platform_edge + cfg.convenience;
    let value_s_platform = cfg.base_value + decision.innovation + cfg.convenience;
    let value_s_direct = cfg.base_value + decision.innovation;

    let net_m = if mode.sells_own_product() {
        value_m - decision.price_m
    } else {
        f64::NEG_INFINITY
    };
    let (net_s_platform, net_s_direct) = if mode.hosts_seller() {
        (
            value_s_platform - decision.price_s_platform,
            value_s_direct - decision.price_s_direct,
        )
    } else {
        (f64::NEG_INFINITY, f64::NEG_INFINITY)
    };

    let (aware_share, unaware_share) = consumer_shares(mode, decision.display_bias);

    let aware = allocate_pool(
        &[
            Offer::new(MarketOption::Platform, net_m),
            Offer::new(MarketOption::SellerOnPlatform, net_s_platform),
            Offer::new(MarketOption::SellerDirect, net_s_direct),
            Offer::fringe(),
        ],
        aware_share,
        cfg,
    );
    // Unaware consumers never discover the seller.
    let unaware = allocate_pool(
        &[Offer::new(MarketOption::Platform, net_m), Offer::fringe()],
        unaware_share,
        cfg,
    );

    let sales_m = aware.units(MarketOption::Platform) + unaware.units(MarketOption::Platform);
    let sales_s_platform = aware.units(MarketOption::SellerOnPlatform);
    let sales_s_direct = aware.units(MarketOption::SellerDirect);
    let innovation_cost = innovation_cost(decision.innovation, cfg);

    let profit_m = decision.price_m * sales_m
        + decision.commission * decision.price_s_platform * sales_s_platform;
    let profit_s = decision.price_s_platform * (1.0 - decision.commission) * sales_s_platform
        + decision.price_s_direct * sales_s_direct
        - innovation_cost;

    Settlement {
        sales_m,
        sales_s_platform,
        sales_s_direct,
        profit_m,
        profit_s,
        innovation_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GameConfig {
        GameConfig::default()
    }

    fn dual_decision() -> RoundDecision {
        RoundDecision {
            mode: BusinessMode::Dual,
            commission: 5.0,
            innovation: 20.0,
            imitation: true,
            price_m: 15.0,
            price_s_platform: 10.0,
            price_s_direct: 5.0,
            display_bias: 1.0,
        }
    }

    #[test]
    fn test_dual_full_visibility_seller_on_platform_wins() {
        let out = settle(&dual_decision(), &cfg());
        // net: M=115, S_on=120, S_off=115 -> S_on takes 120/120 of 1000
        assert_eq!(out.sales_s_platform, 1000.0);
        assert_eq!(out.sales_m, 0.0);
        assert_eq!(out.sales_s_direct, 0.0);
        // cost 0.08 * 15^2 = 18
        assert!((out.innovation_cost - 18.0).abs() < 1e-9);
        assert!((out.profit_m - 5.0 * 10.0 * 1000.0).abs() < 1e-9);
        assert!((out.profit_s - (10.0 * (1.0 - 5.0) * 1000.0 - 18.0)).abs() < 1e-9);
    }

    #[test]
    fn test_seller_mode_min_innovation_costs_nothing() {
        let decision = RoundDecision {
            mode: BusinessMode::Seller,
            commission: 0.0,
            innovation: 5.0,
            imitation: false,
            price_m: 15.0,
            price_s_platform: 0.0,
            price_s_direct: 0.0,
            display_bias: 0.0,
        };
        let out = settle(&decision, &cfg());
        assert_eq!(out.profit_s, 0.0);
        assert_eq!(out.sales_s_platform, 0.0);
        assert_eq!(out.sales_s_direct, 0.0);
        // net M = 100 + 5 + 10 - 15 = 100 -> 100/120 of 1000
        assert!((out.sales_m - 1000.0 * 100.0 / 120.0).abs() < 1e-9);
        assert!((out.profit_m - 15.0 * out.sales_m).abs() < 1e-9);
    }

    #[test]
    fn test_marketplace_never_sells_platform_product() {
        let decision = RoundDecision {
            mode: BusinessMode::Marketplace,
            commission: 2.0,
            innovation: 10.0,
            imitation: false,
            price_m: 0.0,
            price_s_platform: 12.0,
            price_s_direct: 2.0,
            display_bias: 1.0,
        };
        let out = settle(&decision, &cfg());
        assert_eq!(out.sales_m, 0.0);
        // S_on: 120 - 12 = 108, S_off: 110 - 2 = 108 -> tie keeps on-platform
        assert!((out.sales_s_platform - 900.0).abs() < 1e-9);
        assert_eq!(out.sales_s_direct, 0.0);
    }

    #[test]
    fn test_tie_prefers_platform() {
        let offers = [
            Offer::new(MarketOption::Platform, 60.0),
            Offer::new(MarketOption::SellerOnPlatform, 60.0),
            Offer::new(MarketOption::SellerDirect, 60.0),
            Offer::fringe(),
        ];
        let sale = allocate_pool(&offers, 1.0, &cfg());
        assert_eq!(sale.winner, Some(MarketOption::Platform));
        assert_eq!(sale.quantity, 500.0);
    }

    #[test]
    fn test_non_positive_best_means_no_sales() {
        let offers = [
            Offer::new(MarketOption::Platform, -5.0),
            Offer::fringe(),
        ];
        let sale = allocate_pool(&offers, 1.0, &cfg());
        assert_eq!(sale.winner, None);
        assert_eq!(sale.quantity, 0.0);
    }

    #[test]
    fn test_zero_share_pool_is_empty() {
        let offers = [Offer::new(MarketOption::Platform, 50.0), Offer::fringe()];
        assert_eq!(allocate_pool(&offers, 0.0, &cfg()).quantity, 0.0);
    }

    #[test]
    fn test_demand_capped_at_market_size() {
        let offers = [Offer::new(MarketOption::Platform, 500.0), Offer::fringe()];
        let sale = allocate_pool(&offers, 0.5, &cfg());
        assert_eq!(sale.quantity, 500.0);
    }

    #[test]
    fn test_display_bias_splits_pools() {
        let decision = RoundDecision {
            display_bias: 0.25,
            ..dual_decision()
        };
        let out = settle(&decision, &cfg());
        assert!((out.sales_s_platform - 250.0).abs() < 1e-9);
        // unaware 75% only see M (net 115)
        assert!((out.sales_m - 0.75 * 1000.0 * 115.0 / 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_settlement_is_deterministic() {
        let decision = RoundDecision {
            display_bias: 0.37,
            ..dual_decision()
        };
        let a = settle(&decision, &cfg());
        let b = settle(&decision, &cfg());
        assert_eq!(a.profit_m.to_bits(), b.profit_m.to_bits());
        assert_eq!(a.profit_s.to_bits(), b.profit_s.to_bits());
        assert_eq!(a.sales_m.to_bits(), b.sales_m.to_bits());
    }

    #[test]
    fn test_higher_platform_price_never_raises_platform_sales() {
        let mut last = f64::INFINITY;
        for step in 0..40 {
            let decision = RoundDecision {
                mode: BusinessMode::Seller,
                price_m: step as f64 * 4.0,
                display_bias: 0.0,
                ..dual_decision()
            };
            let sales = settle(&decision, &cfg()).sales_m;
            assert!(sales <= last);
            last = sales;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_innovation_cost_floor() {
        assert_eq!(innovation_cost(2.0, &cfg()), 0.0);
        assert!((innovation_cost(15.0, &cfg()) - 8.0).abs() < 1e-9);
    }
}
