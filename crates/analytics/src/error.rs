// In crates/analytics/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The ledger never closed a trade, so ratios over trades are undefined.
    #[error("no trades")]
    NoTrades,
}

pub type Result<T> = std::result::Result<T, Error>;
