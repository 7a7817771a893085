// In crates/risk/src/tiered.rs

use crate::types::{Tier, TieredSizingSettings};
use crate::{Error, Result, SizingPolicy};
use core_types::Side;
use rust_decimal::Decimal;

/// Sizes orders from a secondary oscillator reading.
///
/// Oversold readings buy bigger, overbought readings sell bigger. A reading
/// that falls outside every tier means "not worth acting on".
#[derive(Debug, Clone)]
pub struct TieredSizing {
    settings: TieredSizingSettings,
}

impl TieredSizing {
    /// Creates a new `TieredSizing` after validating every tier.
    pub fn new(settings: TieredSizingSettings) -> Result<Self> {
        for tier in settings.buy_tiers.iter().chain(&settings.sell_tiers) {
            if !tier.threshold.is_finite() {
                return Err(Error::InvalidTierThreshold(tier.threshold));
            }
            if tier.percentage <= Decimal::ZERO || tier.percentage > Decimal::ONE_HUNDRED {
                return Err(Error::InvalidTierPercentage {
                    threshold: tier.threshold,
                    percentage: tier.percentage,
                });
            }
        }
        Ok(Self { settings })
    }
}

fn first_match(tiers: &[Tier], matches: impl Fn(&Tier) -> bool) -> Option<Decimal> {
    tiers.iter().find(|tier| matches(tier)).map(|tier| tier.percentage)
}

impl SizingPolicy for TieredSizing {
    fn name(&self) -> &'static str {
        "TieredSizing"
    }

    fn size(&self, side: Side, sizing_value: Option<f64>) -> Option<Decimal> {
        let value = sizing_value.filter(|v| v.is_finite())?;
        match side {
            Side::Buy => first_match(&self.settings.buy_tiers, |t| value <= t.threshold),
            Side::Sell => first_match(&self.settings.sell_tiers, |t| value >= t.threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_sizing() -> TieredSizing {
        TieredSizing::new(TieredSizingSettings::default()).unwrap()
    }

    #[test]
    fn buy_tiers_are_inclusive_and_ordered() {
        let sizing = default_sizing();
        assert_eq!(sizing.size(Side::Buy, Some(10.0)), Some(dec!(70)));
        assert_eq!(sizing.size(Side::Buy, Some(30.0)), Some(dec!(70)));
        assert_eq!(sizing.size(Side::Buy, Some(30.5)), Some(dec!(30)));
        assert_eq!(sizing.size(Side::Buy, Some(50.0)), Some(dec!(30)));
        assert_eq!(sizing.size(Side::Buy, Some(50.1)), None);
    }

    #[test]
    fn sell_tiers_are_inclusive_and_ordered() {
        let sizing = default_sizing();
        assert_eq!(sizing.size(Side::Sell, Some(85.0)), Some(dec!(100)));
        assert_eq!(sizing.size(Side::Sell, Some(70.0)), Some(dec!(100)));
        assert_eq!(sizing.size(Side::Sell, Some(69.9)), Some(dec!(50)));
        assert_eq!(sizing.size(Side::Sell, Some(50.0)), Some(dec!(50)));
        assert_eq!(sizing.size(Side::Sell, Some(49.9)), None);
    }

    #[test]
    fn missing_or_nan_reading_holds() {
        let sizing = default_sizing();
        assert_eq!(sizing.size(Side::Buy, None), None);
        assert_eq!(sizing.size(Side::Sell, Some(f64::NAN)), None);
    }

    #[test]
    fn rejects_out_of_range_percentage() {
        let mut settings = TieredSizingSettings::default();
        settings.sell_tiers.push(Tier::new(90.0, dec!(150)));
        assert_eq!(
            TieredSizing::new(settings).unwrap_err(),
            Error::InvalidTierPercentage {
                threshold: 90.0,
                percentage: dec!(150)
            }
        );

        let mut settings = TieredSizingSettings::default();
        settings.buy_tiers[0].percentage = Decimal::ZERO;
        assert!(TieredSizing::new(settings).is_err());
    }

    #[test]
    fn empty_tables_never_size() {
        let sizing = TieredSizing::new(TieredSizingSettings {
            buy_tiers: vec![],
            sell_tiers: vec![],
        })
        .unwrap();
        assert_eq!(sizing.size(Side::Buy, Some(0.0)), None);
        assert_eq!(sizing.size(Side::Sell, Some(100.0)), None);
    }
}
