// In crates/engine/src/task.rs

use crate::feed::KlineFeed;
use crate::strategy_factory::{BoxedStrategy, LiveStrategies};
use app_config::types::BotSettings;
use core_types::{DetectionRule, OrderOutcome, OrderRequest, Position, Symbol};
use execution::Executor;
use risk::{PositionController, SizingPolicy, TieredSizing};
use std::time::Duration;
use tokio::time::Instant;

/// Cadence of one trading task.
#[derive(Debug, Clone)]
pub struct TaskSettings {
    pub interval: String,
    pub kline_limit: u16,
    pub poll_interval: Duration,
    pub reset_interval: Duration,
}

impl From<&BotSettings> for TaskSettings {
    fn from(bot: &BotSettings) -> Self {
        Self {
            interval: bot.interval.clone(),
            kline_limit: bot.kline_limit,
            poll_interval: Duration::from_secs(bot.poll_interval_secs),
            reset_interval: Duration::from_secs(bot.reset_interval_secs),
        }
    }
}

/// A self-contained task that manages all trading logic for a single pair.
///
/// Each tick recomputes both strategies over the latest window, asks the
/// controller whether to act, and places at most one order.
pub struct TradingTask {
    symbol: Symbol,
    settings: TaskSettings,
    feed: Box<dyn KlineFeed>,
    timing: BoxedStrategy,
    sizing: BoxedStrategy,
    controller: PositionController<TieredSizing>,
    executor: Box<dyn Executor>,
}

impl TradingTask {
    /// Fails if the timing strategy is not a crossover or the sizing strategy
    /// not a threshold detector.
    pub fn new(
        symbol: Symbol,
        settings: TaskSettings,
        feed: Box<dyn KlineFeed>,
        strategies: LiveStrategies,
        controller: PositionController<TieredSizing>,
        executor: Box<dyn Executor>,
    ) -> anyhow::Result<Self> {
        let LiveStrategies { timing, sizing } = strategies;
        if timing.rule() != DetectionRule::Crossover {
            anyhow::bail!(
                "Timing strategy {} must use the {} rule, not {}",
                timing.name(),
                DetectionRule::Crossover,
                timing.rule()
            );
        }
        if sizing.rule() != DetectionRule::Overbought {
            anyhow::bail!(
                "Sizing strategy {} must use the {} rule, not {}",
                sizing.name(),
                DetectionRule::Overbought,
                sizing.rule()
            );
        }

        let needed = timing.warmup().max(sizing.warmup()) + 1;
        if usize::from(settings.kline_limit) < needed {
            tracing::warn!(
                kline_limit = settings.kline_limit,
                needed,
                "Kline window is shorter than the strategies' warm-up; no signals will fire."
            );
        }

        Ok(Self {
            symbol,
            settings,
            feed,
            timing,
            sizing,
            controller,
            executor,
        })
    }

    /// Runs one polling step from `position` and returns the position to carry
    /// into the next tick, plus the outcome if an order was attempted.
    pub async fn tick(
        &mut self,
        position: Position,
    ) -> anyhow::Result<(Position, Option<OrderOutcome>)> {
        let klines = self
            .feed
            .latest_window(&self.symbol, &self.settings.interval, self.settings.kline_limit)
            .await?;
        let Some(last) = klines.last() else {
            tracing::debug!(symbol = %self.symbol, "Feed returned no klines.");
            return Ok((position, None));
        };

        let timing_events = self.timing.signals(&klines);
        let sizing_events = self.sizing.signals(&klines);

        // Only an event on the newest bar is actionable.
        let timing_signal = timing_events
            .last()
            .filter(|event| event.timestamp == last.open_time);
        let sizing_value = sizing_events.last().map(|event| event.indicator_value);

        tracing::debug!(
            symbol = %self.symbol,
            expected = %position.expected_action(),
            timing = ?timing_signal.map(|e| e.action),
            sizing_value = ?sizing_value,
            close = %last.close,
            "Tick evaluated."
        );

        let Some(decision) = self.controller.decide(&position, timing_signal, sizing_value) else {
            return Ok((position, None));
        };

        let order = OrderRequest {
            symbol: self.symbol.clone(),
            side: decision.action,
            percentage: decision.percentage,
        };
        tracing::info!(
            symbol = %self.symbol,
            side = %order.side,
            percentage = %order.percentage,
            sizing_value = ?sizing_value,
            "Placing order."
        );

        let outcome = self.executor.execute(&order, last.close).await;
        let position = match &outcome {
            OrderOutcome::Filled(fill) => {
                tracing::info!(
                    symbol = %self.symbol,
                    side = %fill.side,
                    price = %fill.price,
                    quantity = %fill.quantity,
                    fee = %fill.fee,
                    "Order filled."
                );
                self.log_balances().await;
                position.advance(fill.side, fill.price)
            }
            OrderOutcome::Declined { reason } => {
                tracing::warn!(symbol = %self.symbol, side = %order.side, %reason, "Order declined.");
                position
            }
            OrderOutcome::TransientFailure { reason } => {
                tracing::warn!(symbol = %self.symbol, side = %order.side, %reason, "Order failed; will retry on a later signal.");
                position
            }
        };

        Ok((position, Some(outcome)))
    }

    async fn log_balances(&self) {
        match self.executor.balances().await {
            Ok(balances) => tracing::info!(
                base_asset = %balances.base_asset,
                base = %balances.base,
                quote_asset = %balances.quote_asset,
                quote = %balances.quote,
                "Position after trade."
            ),
            Err(e) => tracing::warn!(error = %e, "Could not read balances after trade."),
        }
    }

    async fn reconnect(&mut self) {
        if let Err(e) = self.executor.reconnect().await {
            tracing::error!(error = %e, executor = self.executor.name(), "Executor reconnect failed.");
        }
        if let Err(e) = self.feed.reconnect().await {
            tracing::error!(error = %e, "Kline feed reconnect failed.");
        }
    }

    /// The main, long-running loop for this trading task.
    ///
    /// Ticks every `poll_interval` until `runtime` has elapsed. A failing tick
    /// is logged and skipped; it never ends the loop early.
    pub async fn run(&mut self, initial: Position, runtime: Duration) -> Position {
        tracing::info!(
            symbol = %self.symbol,
            interval = %self.settings.interval,
            runtime = ?runtime,
            executor = self.executor.name(),
            sizing = self.controller.policy().name(),
            first_action = %initial.expected_action(),
            "Starting trading task."
        );

        let start = Instant::now();
        let mut last_reset = start;
        let mut position = initial;

        while start.elapsed() < runtime {
            if last_reset.elapsed() >= self.settings.reset_interval {
                self.reconnect().await;
                last_reset = Instant::now();
            }

            match self.tick(position).await {
                Ok((next, _)) => position = next,
                Err(e) => tracing::error!(symbol = %self.symbol, error = %e, "Tick failed."),
            }

            tokio::time::sleep(self.settings.poll_interval).await;
        }

        tracing::info!(
            symbol = %self.symbol,
            phase = ?position.phase,
            "Runtime elapsed; trading task finished."
        );
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::{Balances, DeclineReason, Fill, Kline, Phase, Side, SignalEvent};
    use risk::types::TieredSizingSettings;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use strategies::Strategy;

    const BARS: i64 = 5;
    const LAST_OPEN: i64 = (BARS - 1) * 60_000;

    fn window() -> Vec<Kline> {
        (0..BARS)
            .map(|i| Kline {
                open_time: i * 60_000,
                open: dec!(100),
                high: dec!(100),
                low: dec!(100),
                close: Decimal::from(100 + i),
                volume: Decimal::ONE,
                close_time: i * 60_000 + 59_999,
            })
            .collect()
    }

    struct StaticFeed {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl KlineFeed for StaticFeed {
        async fn latest_window(&self, _: &Symbol, _: &str, _: u16) -> anyhow::Result<Vec<Kline>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("read timeout");
            }
            Ok(window())
        }
    }

    /// Emits a fixed list of events regardless of input.
    struct Scripted {
        rule: DetectionRule,
        events: Vec<SignalEvent>,
    }

    impl Strategy for Scripted {
        fn name(&self) -> &'static str {
            "Scripted"
        }
        fn rule(&self) -> DetectionRule {
            self.rule
        }
        fn warmup(&self) -> usize {
            0
        }
        fn signals(&self, _klines: &[Kline]) -> Vec<SignalEvent> {
            self.events.clone()
        }
    }

    fn event(timestamp: i64, action: Side, value: f64) -> SignalEvent {
        SignalEvent {
            timestamp,
            indicator_value: value,
            action,
            price: dec!(104),
        }
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Fill,
        Decline,
    }

    #[derive(Clone, Default)]
    struct Journal {
        orders: Arc<Mutex<Vec<OrderRequest>>>,
        reconnects: Arc<AtomicUsize>,
    }

    struct MockExecutor {
        mode: Mode,
        journal: Journal,
    }

    #[async_trait]
    impl Executor for MockExecutor {
        fn name(&self) -> &'static str {
            "MockExecutor"
        }

        async fn balances(&self) -> execution::Result<Balances> {
            Ok(Balances {
                base_asset: "ETH".into(),
                base: Decimal::ZERO,
                quote_asset: "BUSD".into(),
                quote: dec!(1000),
            })
        }

        async fn execute(&mut self, order: &OrderRequest, price: Decimal) -> OrderOutcome {
            self.journal.orders.lock().unwrap().push(order.clone());
            match self.mode {
                Mode::Fill => OrderOutcome::Filled(Fill {
                    symbol: order.symbol.clone(),
                    side: order.side,
                    order_id: Some(1),
                    price,
                    quantity: Decimal::ONE,
                    quote_quantity: price,
                    fee: Decimal::ZERO,
                }),
                Mode::Decline => OrderOutcome::Declined {
                    reason: DeclineReason::BelowMinNotional {
                        notional: dec!(5),
                        minimum: dec!(10),
                    },
                },
            }
        }

        async fn reconnect(&mut self) -> execution::Result<()> {
            self.journal.reconnects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn settings() -> TaskSettings {
        TaskSettings {
            interval: "1m".into(),
            kline_limit: BARS as u16,
            poll_interval: Duration::from_secs(10),
            reset_interval: Duration::from_secs(15),
        }
    }

    fn task(
        timing: Vec<SignalEvent>,
        sizing: Vec<SignalEvent>,
        mode: Mode,
        fail_feed: bool,
    ) -> (TradingTask, Journal, Arc<AtomicUsize>) {
        let journal = Journal::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let task = TradingTask::new(
            Symbol("ETHBUSD".into()),
            settings(),
            Box::new(StaticFeed {
                calls: calls.clone(),
                fail: fail_feed,
            }),
            LiveStrategies {
                timing: Box::new(Scripted {
                    rule: DetectionRule::Crossover,
                    events: timing,
                }),
                sizing: Box::new(Scripted {
                    rule: DetectionRule::Overbought,
                    events: sizing,
                }),
            },
            PositionController::new(TieredSizing::new(TieredSizingSettings::default()).unwrap()),
            Box::new(MockExecutor {
                mode,
                journal: journal.clone(),
            }),
        )
        .unwrap();
        (task, journal, calls)
    }

    #[tokio::test]
    async fn fresh_signal_places_sized_order_and_advances() {
        let (mut task, journal, _) = task(
            vec![event(LAST_OPEN, Side::Buy, 0.4)],
            vec![event(60_000, Side::Buy, 25.0)],
            Mode::Fill,
            false,
        );

        let (position, outcome) = task.tick(Position::default()).await.unwrap();

        assert!(outcome.unwrap().is_filled());
        assert_eq!(position.phase, Phase::AwaitingExit);
        assert_eq!(position.entry_price, Some(dec!(104)));
        let orders = journal.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[0].percentage, dec!(70));
    }

    #[tokio::test]
    async fn stale_timing_signal_holds() {
        let (mut task, journal, _) = task(
            vec![event(LAST_OPEN - 60_000, Side::Buy, 0.4)],
            vec![event(LAST_OPEN, Side::Buy, 25.0)],
            Mode::Fill,
            false,
        );

        let (position, outcome) = task.tick(Position::default()).await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(position, Position::default());
        assert!(journal.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sizing_outside_tiers_holds() {
        let (mut task, journal, _) = task(
            vec![event(LAST_OPEN, Side::Sell, -0.2)],
            vec![event(LAST_OPEN, Side::Sell, 45.0)],
            Mode::Fill,
            false,
        );

        let held = Position::new(Phase::AwaitingExit);
        let (position, outcome) = task.tick(held).await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(position, held);
        assert!(journal.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn declined_order_keeps_phase() {
        let (mut task, journal, _) = task(
            vec![event(LAST_OPEN, Side::Sell, -0.2)],
            vec![event(LAST_OPEN, Side::Sell, 72.0)],
            Mode::Decline,
            false,
        );

        let held = Position::new(Phase::AwaitingExit);
        let (position, outcome) = task.tick(held).await.unwrap();

        assert!(matches!(outcome, Some(OrderOutcome::Declined { .. })));
        assert_eq!(position.phase, Phase::AwaitingExit);
        assert_eq!(journal.orders.lock().unwrap()[0].percentage, dec!(100));
    }

    #[tokio::test]
    async fn wrong_phase_signal_holds() {
        let (mut task, journal, _) = task(
            vec![event(LAST_OPEN, Side::Sell, -0.2)],
            vec![event(LAST_OPEN, Side::Sell, 80.0)],
            Mode::Fill,
            false,
        );

        let (position, outcome) = task.tick(Position::default()).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(position.phase, Phase::AwaitingEntry);
        assert!(journal.orders.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_after_runtime_and_reconnects_periodically() {
        let (mut task, journal, calls) = task(vec![], vec![], Mode::Fill, false);

        let position = task.run(Position::default(), Duration::from_secs(35)).await;

        // Ticks at 0s, 10s, 20s and 30s.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // One reconnect, before the tick at 20s.
        assert_eq!(journal.reconnects.load(Ordering::SeqCst), 1);
        assert_eq!(position, Position::default());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_ticks_do_not_end_the_loop() {
        let (mut task, _, calls) = task(vec![], vec![], Mode::Fill, true);

        let held = Position::new(Phase::AwaitingExit);
        let position = task.run(held, Duration::from_secs(25)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(position, held);
    }

    #[test]
    fn rejects_threshold_timing_strategy() {
        let result = TradingTask::new(
            Symbol("ETHBUSD".into()),
            settings(),
            Box::new(StaticFeed {
                calls: Arc::new(AtomicUsize::new(0)),
                fail: false,
            }),
            LiveStrategies {
                timing: Box::new(Scripted {
                    rule: DetectionRule::Overbought,
                    events: vec![],
                }),
                sizing: Box::new(Scripted {
                    rule: DetectionRule::Overbought,
                    events: vec![],
                }),
            },
            PositionController::new(TieredSizing::new(TieredSizingSettings::default()).unwrap()),
            Box::new(MockExecutor {
                mode: Mode::Fill,
                journal: Journal::default(),
            }),
        );
        let err = result.err().unwrap();
        assert!(err.to_string().contains("must use the CROSSOVER rule"));
    }
}
