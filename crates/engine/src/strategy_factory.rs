//! This module provides a factory for creating the live loop's strategies from configuration.

use anyhow::Context;
use app_config::types::StrategySettings;
use strategies::{Strategy, create_strategy};

pub type BoxedStrategy = Box<dyn Strategy + Send + Sync>;

/// The two strategies a live run needs.
pub struct LiveStrategies {
    /// Crossover strategy that decides when to trade.
    pub timing: BoxedStrategy,
    /// Threshold strategy whose latest reading sizes the trade.
    pub sizing: BoxedStrategy,
}

/// Creates the timing and sizing strategies described by `settings`.
pub fn create_live_strategies(settings: &StrategySettings) -> anyhow::Result<LiveStrategies> {
    let timing = create_strategy(&settings.timing, &settings.indicators)
        .with_context(|| format!("Failed to build timing strategy {}", settings.timing))?;
    let sizing = create_strategy(&settings.sizing, &settings.indicators)
        .with_context(|| format!("Failed to build sizing strategy {}", settings.sizing))?;

    tracing::info!(
        timing = timing.name(),
        sizing = sizing.name(),
        "Live strategies created."
    );
    Ok(LiveStrategies { timing, sizing })
}
