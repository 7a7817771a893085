// In crates/risk/src/full.rs

use crate::SizingPolicy;
use core_types::Side;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// All-in / all-out sizing used by the backtest ledger. Ignores the sizing value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullBalance;

impl SizingPolicy for FullBalance {
    fn name(&self) -> &'static str {
        "FullBalance"
    }

    fn size(&self, _side: Side, _sizing_value: Option<f64>) -> Option<Decimal> {
        Some(dec!(100))
    }
}
