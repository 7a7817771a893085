// In crates/strategies/src/macd_crossover.rs

use crate::detector::{Detection, detect};
use crate::indicators::{closes, macd_indicator, macd_series};
use crate::types::MacdSettings;
use crate::{Result, Strategy};
use core_types::{DetectionRule, Kline, SignalEvent};
use ta::indicators::MovingAverageConvergenceDivergence as Macd;

/// MACD line against its signal line (12/26/9 by default).
///
/// This is the timing strategy of the live bot: it decides *when* to trade.
#[derive(Debug, Clone)]
pub struct MacdCrossover {
    settings: MacdSettings,
    macd: Macd,
}

impl MacdCrossover {
    pub fn new(settings: MacdSettings) -> Result<Self> {
        Ok(Self {
            macd: macd_indicator(
                settings.fast_period,
                settings.slow_period,
                settings.signal_period,
            )?,
            settings,
        })
    }
}

impl Strategy for MacdCrossover {
    fn name(&self) -> &'static str {
        "MacdCrossover"
    }

    fn rule(&self) -> DetectionRule {
        DetectionRule::Crossover
    }

    fn warmup(&self) -> usize {
        (self.settings.slow_period + self.settings.signal_period) as usize - 2
    }

    fn signals(&self, klines: &[Kline]) -> Vec<SignalEvent> {
        let lines = macd_series(
            self.macd.clone(),
            &closes(klines),
            self.settings.slow_period as usize,
            self.settings.signal_period as usize,
        );

        detect(
            klines,
            Detection::Crossover {
                fast: &lines.macd,
                slow: &lines.signal,
            },
        )
    }
}
