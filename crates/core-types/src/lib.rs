// In crates/core-types/src/lib.rs

pub mod error;
pub mod strategy;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use strategy::{DetectionRule, IndicatorKind, StrategyConfig};
pub use types::{
    Balances, DeclineReason, Fill, Kline, LedgerEntry, OrderOutcome, OrderRequest, Phase,
    Position, Side, SignalEvent, Symbol,
};
