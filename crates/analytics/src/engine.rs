// In crates/analytics/src/engine.rs

use crate::types::PerformanceReport;
use core_types::{LedgerEntry, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The engine responsible for calculating performance metrics from a ledger.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the report for a replay that started with `initial_balance` and
    /// ended marked at `final_balance`.
    ///
    /// A SELL closes a trade only if a BUY precedes it; a trailing BUY that
    /// was never sold is not a trade.
    pub fn calculate(
        &self,
        initial_balance: Decimal,
        final_balance: Decimal,
        ledger: &[LedgerEntry],
    ) -> PerformanceReport {
        let mut total_trades = 0;
        let mut wins = 0;
        let mut entry_price: Option<Decimal> = None;

        for entry in ledger {
            match entry.side {
                Side::Buy => entry_price = Some(entry.price),
                Side::Sell => {
                    if let Some(bought_at) = entry_price.take() {
                        total_trades += 1;
                        if entry.price > bought_at {
                            wins += 1;
                        }
                    }
                }
            }
        }

        let change_percentage = (final_balance - initial_balance)
            .checked_div(initial_balance)
            .map(|ratio| ratio * dec!(100))
            .unwrap_or(Decimal::ZERO);

        PerformanceReport {
            initial_balance,
            final_balance,
            change_percentage,
            total_trades,
            wins,
        }
    }
}
