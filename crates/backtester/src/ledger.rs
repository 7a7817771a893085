// In crates/backtester/src/ledger.rs

use core_types::{LedgerEntry, Side};
use rust_decimal::Decimal;

/// Append-only record of the simulated trades of one backtest.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timestamp: i64, price: Decimal, side: Side) {
        tracing::debug!(timestamp, price = %price, side = %side, "Ledger entry recorded.");
        self.entries.push(LedgerEntry {
            timestamp,
            price,
            side,
        });
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn last_price(&self) -> Option<Decimal> {
        self.entries.last().map(|e| e.price)
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }
}
