// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MacdSettings {
    pub fast_period: u32,
    pub slow_period: u32,
    pub signal_period: u32,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SmaSettings {
    pub fast_period: u32,
    pub slow_period: u32,
}

impl Default for SmaSettings {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 50,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RsiSettings {
    pub period: u32,
    /// Readings above this pivot emit SELL.
    pub overbought: f64,
    /// Readings below this pivot emit BUY.
    pub oversold: f64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        Self {
            period: 15,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

/// Parameters for every indicator a strategy can be built on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct IndicatorSettings {
    #[serde(default)]
    pub macd: MacdSettings,
    #[serde(default)]
    pub sma: SmaSettings,
    #[serde(default)]
    pub rsi: RsiSettings,
}
