// In crates/engine/src/lib.rs

pub mod feed;
pub mod strategy_factory;
pub mod task;

pub use feed::{KlineFeed, RestKlineFeed};
pub use strategy_factory::{BoxedStrategy, LiveStrategies, create_live_strategies};
pub use task::{TaskSettings, TradingTask};
