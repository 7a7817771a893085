use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The indicator a strategy reads.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Rsi,
    Sma,
    Macd,
}

/// How signals are derived from the indicator.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetectionRule {
    /// Edge-triggered: two lines changing relative order.
    Crossover,
    /// Level-triggered: an oscillator beyond fixed pivots.
    Overbought,
}

/// An indicator/rule pairing, e.g. `MACD` + `CROSSOVER`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyConfig {
    pub indicator: IndicatorKind,
    pub rule: DetectionRule,
}

impl StrategyConfig {
    pub fn new(indicator: IndicatorKind, rule: DetectionRule) -> Self {
        Self { indicator, rule }
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.indicator, self.rule)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Macd => "MACD",
        })
    }
}

impl fmt::Display for DetectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DetectionRule::Crossover => "CROSSOVER",
            DetectionRule::Overbought => "OVERBOUGHT",
        })
    }
}

impl FromStr for IndicatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RSI" => Ok(IndicatorKind::Rsi),
            "SMA" => Ok(IndicatorKind::Sma),
            "MACD" => Ok(IndicatorKind::Macd),
            _ => Err(Error::UnknownIndicator(s.to_string())),
        }
    }
}

impl FromStr for DetectionRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CROSSOVER" => Ok(DetectionRule::Crossover),
            "OVERBOUGHT" => Ok(DetectionRule::Overbought),
            _ => Err(Error::UnknownRule(s.to_string())),
        }
    }
}
