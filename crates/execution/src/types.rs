// In crates/execution/src/types.rs

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    pub base_asset: String,
    pub quote_asset: String,
    pub base_balance: Decimal,
    pub quote_balance: Decimal,
    /// The taker fee for the exchange (e.g., 0.001 for 0.1%).
    pub taker_fee: Decimal,
    /// Smallest order value, in the quote asset, the simulated exchange accepts.
    pub min_notional: Decimal,
}

/// Buys `amount` of `asset` whenever its free balance drops below `min_balance`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeTopUp {
    pub asset: String,
    pub min_balance: Decimal,
    pub amount: Decimal,
}
