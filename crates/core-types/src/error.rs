// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown order side '{0}', expected BUY or SELL")]
    UnknownSide(String),

    #[error("Unknown indicator '{0}', expected one of RSI, SMA, MACD")]
    UnknownIndicator(String),

    #[error("Unknown detection rule '{0}', expected CROSSOVER or OVERBOUGHT")]
    UnknownRule(String),
}

pub type Result<T> = std::result::Result<T, Error>;
