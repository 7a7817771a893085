// In crates/strategies/src/error.rs

use core_types::StrategyConfig;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Unsupported indicator/strategy pairing: {0}")]
    UnsupportedPairing(StrategyConfig),

    #[error("Invalid {indicator} period: {period}")]
    InvalidPeriod { indicator: &'static str, period: u32 },

    #[error("Invalid {indicator} settings: {reason}")]
    InvalidSettings {
        indicator: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
