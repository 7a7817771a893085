// In crates/risk/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Invalid sizing tier {threshold} -> {percentage}%: percentage must be in (0, 100]")]
    InvalidTierPercentage {
        threshold: f64,
        percentage: rust_decimal::Decimal,
    },

    #[error("Invalid sizing tier threshold {0}: must be a finite number")]
    InvalidTierThreshold(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
