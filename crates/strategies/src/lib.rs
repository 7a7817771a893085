// In crates/strategies/src/lib.rs

use core_types::{DetectionRule, Kline, SignalEvent};

pub mod detector;
pub mod error;
pub mod factory;
pub mod indicators;
pub mod ma_crossover;
pub mod macd_crossover;
pub mod rsi_overbought;
pub mod types;

pub use detector::{Detection, Pivots, detect};
pub use error::{Error, Result};
pub use factory::create_strategy;
pub use indicators::IndicatorSeries;

/// The universal interface for a signal-producing strategy.
///
/// A strategy turns a window of klines into an ordered list of `SignalEvent`s.
/// It holds no state between calls: the same window always yields the same
/// events, so one instance can be reused across ticks and backtests.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Whether this strategy emits edge (crossover) or level (threshold) events.
    fn rule(&self) -> DetectionRule;

    /// Number of leading bars that can never produce an event.
    fn warmup(&self) -> usize;

    fn signals(&self, klines: &[Kline]) -> Vec<SignalEvent>;
}
