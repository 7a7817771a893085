// In crates/analytics/src/types.rs

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// Summary of an all-in/all-out replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    /// (final - initial) / initial * 100.
    pub change_percentage: Decimal,
    /// Completed BUY -> SELL round trips.
    pub total_trades: u32,
    /// Round trips whose SELL price was strictly above the BUY price.
    pub wins: u32,
}

impl PerformanceReport {
    /// Share of winning round trips in [0, 1].
    pub fn win_rate(&self) -> Result<f64> {
        if self.total_trades == 0 {
            return Err(Error::NoTrades);
        }
        Ok(f64::from(self.wins) / f64::from(self.total_trades))
    }
}
