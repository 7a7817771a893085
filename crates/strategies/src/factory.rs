use crate::ma_crossover::SmaCrossover;
use crate::macd_crossover::MacdCrossover;
use crate::rsi_overbought::RsiOverbought;
use crate::types::IndicatorSettings;
use crate::{Error, Result, Strategy};
use core_types::{DetectionRule, IndicatorKind, StrategyConfig};

/// Builds the strategy for an indicator/rule pairing.
///
/// Only MACD/CROSSOVER, SMA/CROSSOVER and RSI/OVERBOUGHT exist; any other
/// pairing is rejected here instead of producing an empty signal list later.
pub fn create_strategy(
    config: &StrategyConfig,
    settings: &IndicatorSettings,
) -> Result<Box<dyn Strategy + Send + Sync>> {
    let strategy: Box<dyn Strategy + Send + Sync> = match (config.indicator, config.rule) {
        (IndicatorKind::Macd, DetectionRule::Crossover) => {
            Box::new(MacdCrossover::new(settings.macd.clone())?)
        }
        (IndicatorKind::Sma, DetectionRule::Crossover) => {
            Box::new(SmaCrossover::new(settings.sma.clone())?)
        }
        (IndicatorKind::Rsi, DetectionRule::Overbought) => {
            Box::new(RsiOverbought::new(settings.rsi.clone())?)
        }
        _ => return Err(Error::UnsupportedPairing(*config)),
    };

    Ok(strategy)
}
