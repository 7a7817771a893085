// In crates/risk/src/types.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// One row of a sizing table.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    /// Indicator level the sizing value is compared against.
    pub threshold: f64,
    /// Share of the free balance to commit, in percent.
    pub percentage: Decimal,
}

impl Tier {
    pub fn new(threshold: f64, percentage: Decimal) -> Self {
        Self {
            threshold,
            percentage,
        }
    }
}

/// Settings for `TieredSizing`.
///
/// Buy tiers match when the sizing value is at or below the threshold, sell
/// tiers when it is at or above. Tiers are checked in the order given.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TieredSizingSettings {
    pub buy_tiers: Vec<Tier>,
    pub sell_tiers: Vec<Tier>,
}

impl Default for TieredSizingSettings {
    fn default() -> Self {
        Self {
            buy_tiers: vec![Tier::new(30.0, dec!(70)), Tier::new(50.0, dec!(30))],
            sell_tiers: vec![Tier::new(70.0, dec!(100)), Tier::new(50.0, dec!(50))],
        }
    }
}
