// In crates/strategies/src/rsi_overbought.rs

use crate::detector::{Detection, Pivots, detect};
use crate::indicators::{closes, rsi_indicator, series};
use crate::types::RsiSettings;
use crate::{Error, Result, Strategy};
use core_types::{DetectionRule, Kline, SignalEvent};
use ta::indicators::RelativeStrengthIndex as Rsi;

/// RSI overbought/oversold levels (period 15, pivots 70/30 by default).
///
/// Emits on every bar beyond a pivot, so runs of identical actions are normal.
/// The live bot reads the latest event's RSI value to size its orders.
#[derive(Debug, Clone)]
pub struct RsiOverbought {
    settings: RsiSettings,
    rsi: Rsi,
}

impl RsiOverbought {
    pub fn new(settings: RsiSettings) -> Result<Self> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !(in_range(settings.oversold)
            && in_range(settings.overbought)
            && settings.oversold < settings.overbought)
        {
            return Err(Error::InvalidSettings {
                indicator: "RSI",
                reason: format!(
                    "pivots must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                    settings.oversold, settings.overbought
                ),
            });
        }

        Ok(Self {
            rsi: rsi_indicator(settings.period)?,
            settings,
        })
    }

    pub fn pivots(&self) -> Pivots {
        Pivots {
            upper: self.settings.overbought,
            lower: self.settings.oversold,
        }
    }
}

impl Strategy for RsiOverbought {
    fn name(&self) -> &'static str {
        "RsiOverbought"
    }

    fn rule(&self) -> DetectionRule {
        DetectionRule::Overbought
    }

    fn warmup(&self) -> usize {
        self.settings.period as usize
    }

    fn signals(&self, klines: &[Kline]) -> Vec<SignalEvent> {
        let rsi = series(self.rsi.clone(), &closes(klines), self.warmup());

        detect(
            klines,
            Detection::Threshold {
                oscillator: &rsi,
                pivots: self.pivots(),
            },
        )
    }
}
