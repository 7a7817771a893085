// In crates/backtester/src/lib.rs

pub mod ledger;
pub mod report;

use analytics::{AnalyticsEngine, PerformanceReport};
use core_types::{Kline, LedgerEntry, Position, Side, SignalEvent};
use risk::{Decision, FullBalance, PositionController};
use rust_decimal::Decimal;
use strategies::Strategy;

pub use ledger::Ledger;
pub use report::{print_report, render_report};

/// Inclusive time range, in milliseconds since the epoch, that a backtest replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktestWindow {
    pub start: i64,
    pub end: i64,
}

impl BacktestWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// The window covering all of history.
    pub fn unbounded() -> Self {
        Self::new(i64::MIN, i64::MAX)
    }
}

/// Everything a finished replay produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub ledger: Vec<LedgerEntry>,
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    pub performance: PerformanceReport,
}

/// The main engine for running historical backtests.
///
/// Replays signal events through an all-in/all-out account: a BUY converts
/// the whole quote balance into units, a SELL converts every unit back.
pub struct Backtester {
    controller: PositionController<FullBalance>,
    window: BacktestWindow,
    initial_balance: Decimal,
}

impl Backtester {
    pub fn new(window: BacktestWindow, initial_balance: Decimal) -> Self {
        Self {
            controller: PositionController::new(FullBalance),
            window,
            initial_balance,
        }
    }

    /// Computes `strategy`'s signals over `klines` and replays them.
    pub fn run_strategy(&self, strategy: &dyn Strategy, klines: &[Kline]) -> BacktestReport {
        let signals = strategy.signals(klines);
        tracing::info!(
            strategy = strategy.name(),
            klines = klines.len(),
            signals = signals.len(),
            "Signals computed for backtest."
        );
        self.run(&signals)
    }

    /// Replays `signals` (ordered by timestamp) inside the window.
    pub fn run(&self, signals: &[SignalEvent]) -> BacktestReport {
        let mut position = Position::default();
        let mut ledger = Ledger::new();
        let mut balance = self.initial_balance;
        let mut held_units = Decimal::ZERO;

        for signal in signals {
            if signal.timestamp < self.window.start {
                continue;
            }
            if signal.timestamp > self.window.end {
                break;
            }

            let Some(decision) = self.controller.decide(&position, Some(signal), None) else {
                continue;
            };

            match decision.action {
                Side::Buy => {
                    let Some(units) = balance.checked_div(decision.price) else {
                        skip_unpriceable(&decision, balance);
                        continue;
                    };
                    held_units = units;
                    balance = Decimal::ZERO;
                }
                Side::Sell => {
                    let Some(proceeds) = held_units.checked_mul(decision.price) else {
                        skip_unpriceable(&decision, held_units);
                        continue;
                    };
                    balance = proceeds;
                    held_units = Decimal::ZERO;
                }
            }

            ledger.record(decision.timestamp, decision.price, decision.action);
            position = decision.apply(position);
        }

        // An open holding is marked at its last ledger price, not sold.
        let final_balance = match ledger.last_price() {
            Some(price) if !held_units.is_zero() => held_units.saturating_mul(price).saturating_add(balance),
            _ => balance,
        };

        let performance =
            AnalyticsEngine::new().calculate(self.initial_balance, final_balance, ledger.entries());

        tracing::info!(
            entries = ledger.entries().len(),
            initial_balance = %self.initial_balance,
            final_balance = %final_balance,
            trades = performance.total_trades,
            "Backtest finished."
        );

        BacktestReport {
            ledger: ledger.into_entries(),
            initial_balance: self.initial_balance,
            final_balance,
            performance,
        }
    }
}

fn skip_unpriceable(decision: &Decision, amount: Decimal) {
    tracing::warn!(
        timestamp = decision.timestamp,
        side = %decision.action,
        price = %decision.price,
        %amount,
        "Trade value is undefined (zero price) or out of range; skipping signal."
    );
}
