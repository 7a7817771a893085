// In crates/risk/src/lib.rs

use core_types::Side;
use rust_decimal::Decimal;

pub mod controller;
pub mod error;
pub mod full;
pub mod tiered;
pub mod types;

// Re-export public types
pub use controller::{Decision, PositionController};
pub use error::{Error, Result};
pub use full::FullBalance;
pub use tiered::TieredSizing;

/// Decides how much of the available balance an accepted action may use.
///
/// `sizing_value` is the secondary indicator reading for the tick (for example
/// the latest RSI event); `None` means no reading is available.
pub trait SizingPolicy {
    /// The name of the sizing policy.
    fn name(&self) -> &'static str;

    /// Percentage in (0, 100] to commit, or `None` to hold.
    fn size(&self, side: Side, sizing_value: Option<f64>) -> Option<Decimal>;
}
