// In crates/strategies/src/ma_crossover.rs

use crate::detector::{Detection, detect};
use crate::indicators::{closes, series, sma_indicator};
use crate::types::SmaSettings;
use crate::{Error, Result, Strategy};
use core_types::{DetectionRule, Kline, SignalEvent};
use ta::indicators::SimpleMovingAverage as Sma;

/// Fast/slow simple moving average crossover (12/50 by default).
///
/// BUY when the fast average moves above the slow one, SELL when it falls back
/// to or below it.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    /// The configuration for this strategy instance.
    settings: SmaSettings,
    fast: Sma,
    slow: Sma,
}

impl SmaCrossover {
    /// Creates a new `SmaCrossover` strategy instance from its settings.
    pub fn new(settings: SmaSettings) -> Result<Self> {
        if settings.fast_period >= settings.slow_period {
            return Err(Error::InvalidSettings {
                indicator: "SMA",
                reason: format!(
                    "fast period ({}) must be shorter than slow period ({})",
                    settings.fast_period, settings.slow_period
                ),
            });
        }

        Ok(Self {
            fast: sma_indicator(settings.fast_period)?,
            slow: sma_indicator(settings.slow_period)?,
            settings,
        })
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &'static str {
        "SmaCrossover"
    }

    fn rule(&self) -> DetectionRule {
        DetectionRule::Crossover
    }

    fn warmup(&self) -> usize {
        self.settings.slow_period as usize - 1
    }

    fn signals(&self, klines: &[Kline]) -> Vec<SignalEvent> {
        let closes = closes(klines);
        let fast = series(self.fast.clone(), &closes, self.settings.fast_period as usize - 1);
        let slow = series(self.slow.clone(), &closes, self.warmup());

        detect(klines, Detection::Crossover { fast: &fast, slow: &slow })
    }
}
