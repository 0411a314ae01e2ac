use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform business model for the product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessMode {
    /// Platform sells its own product and hosts the seller
    Dual,
    /// Platform only hosts the seller
    Marketplace,
    /// Platform only sells its own product
    Seller,
}

impl BusinessMode {
    /// All modes in prompt order
    pub const ALL: [BusinessMode; 3] = [
        BusinessMode::Dual,
        BusinessMode::Marketplace,
        BusinessMode::Seller,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessMode::Dual => "dual",
            BusinessMode::Marketplace => "marketplace",
            BusinessMode::Seller => "seller",
        }
    }

    /// Does the platform host the seller (commission and seller prices apply)?
    pub fn hosts_seller(&self) -> bool {
        matches!(self, BusinessMode::Dual | BusinessMode::Marketplace)
    }

    /// Does the platform sell its own product?
    pub fn sells_own_product(&self) -> bool {
        matches!(self, BusinessMode::Dual | BusinessMode::Seller)
    }
}

impl fmt::Display for BusinessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for BusinessMode {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "dual" => Ok(BusinessMode::Dual),
            "marketplace" => Ok(BusinessMode::Marketplace),
            "seller" => Ok(BusinessMode::Seller),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

/// Round protocol stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Platform picks a business mode
    ModeSelection,
    /// Platform sets the commission
    Fee,
    /// Seller sets the innovation level
    Innovation,
    /// Platform decides whether to copy the seller's innovation
    Imitation,
    /// Platform prices its own product
    PlatformPricing,
    /// Seller prices on and off the platform
    SellerPricing,
    /// Platform decides how many consumers see the seller
    DisplayBias,
    /// Outcome computed and recorded
    Settled,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ModeSelection => "MODE_SELECTION",
            Stage::Fee => "FEE",
            Stage::Innovation => "INNOVATION",
            Stage::Imitation => "IMITATION",
            Stage::PlatformPricing => "PLATFORM_PRICING",
            Stage::SellerPricing => "SELLER_PRICING",
            Stage::DisplayBias => "DISPLAY_BIAS",
            Stage::Settled => "SETTLED",
        }
    }

    /// Next stage in the protocol, `None` once settled
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;

        match self {
            ModeSelection => Some(Fee),
            Fee => Some(Innovation),
            Innovation => Some(Imitation),
            Imitation => Some(PlatformPricing),
            PlatformPricing => Some(SellerPricing),
            SellerPricing => Some(DisplayBias),
            DisplayBias => Some(Settled),
            Settled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Settled)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!(BusinessMode::try_from("DUAL").unwrap(), BusinessMode::Dual);
        assert_eq!(
            BusinessMode::try_from(" marketplace ").unwrap(),
            BusinessMode::Marketplace
        );
        assert!(BusinessMode::try_from("hybrid").is_err());
    }

    #[test]
    fn test_mode_capabilities() {
        assert!(BusinessMode::Dual.hosts_seller());
        assert!(BusinessMode::Dual.sells_own_product());
        assert!(BusinessMode::Marketplace.hosts_seller());
        assert!(!BusinessMode::Marketplace.sells_own_product());
        assert!(!BusinessMode::Seller.hosts_seller());
        assert!(BusinessMode::Seller.sells_own_product());
    }

    #[test]
    fn test_stage_order_ends_settled() {
        let mut stage = Stage::ModeSelection;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited.len(), 8);
        assert!(stage.is_terminal());
        assert_eq!(visited[2], Stage::Innovation);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&BusinessMode::Marketplace).unwrap();
        assert_eq!(json, "\"marketplace\"");
    }
}
