// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::ApiClient;
use app_config::{Runtime, Settings};
use backtester::{BacktestWindow, Backtester};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use core_types::{DetectionRule, IndicatorKind, Phase, Position, Side, StrategyConfig, Symbol};
use engine::{RestKlineFeed, TaskSettings, TradingTask};
use execution::{Executor, FeeTopUp, LiveExecutor, SimulatedExecutor, SimulationSettings};
use risk::{PositionController, TieredSizing};
use rust_decimal::Decimal;
use tracing_subscriber::prelude::*;

mod history;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "A Binance Spot trading bot driven by indicator crossovers."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Trades one pair until RUNTIME has elapsed.
    Run {
        /// The trading pair (e.g., "ETHUSDT").
        symbol: String,

        /// How long to trade for, e.g. "30m", "12h" or "3600s".
        runtime: Runtime,

        /// Kline interval; defaults to `bot.interval`.
        #[arg(short, long)]
        interval: Option<String>,

        /// The first action to wait for (BUY or SELL); defaults to `bot.initial_state`.
        #[arg(long)]
        initial_state: Option<Side>,

        /// Fill orders against simulated balances instead of the exchange.
        #[arg(long)]
        paper: bool,
    },

    /// Replays a strategy over historical klines and prints the ledger.
    Backtest {
        /// The trading pair (e.g., "ETHUSDT").
        symbol: String,

        /// First day of the window, in YYYY-MM-DD format (UTC).
        #[arg(long)]
        start_date: String,

        /// Last day of the window (inclusive), in YYYY-MM-DD format (UTC).
        #[arg(long)]
        end_date: String,

        #[arg(short, long)]
        interval: Option<String>,

        /// Starting balance in the quote asset; defaults to `backtest.initial_balance`.
        #[arg(long)]
        balance: Option<Decimal>,

        /// RSI, SMA or MACD; defaults to `strategies.backtest`.
        #[arg(long)]
        indicator: Option<IndicatorKind>,

        /// CROSSOVER or OVERBOUGHT.
        #[arg(long)]
        rule: Option<DetectionRule>,
    },

    /// Prints the signal events of the latest kline window.
    Signals {
        /// The trading pair (e.g., "ETHUSDT").
        symbol: String,

        #[arg(short, long)]
        interval: Option<String>,

        #[arg(long)]
        indicator: Option<IndicatorKind>,

        #[arg(long)]
        rule: Option<DetectionRule>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings()?;

    let default_level = settings
        .app
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("reqwest", tracing::Level::WARN)
            .with_target("hyper", tracing::Level::WARN)
            .with_default(default_level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!(environment = %settings.app.environment, "Starting Atlas");

    match cli.command {
        Commands::Run {
            symbol,
            runtime,
            interval,
            initial_state,
            paper,
        } => {
            handle_run(settings, symbol, runtime, interval, initial_state, paper).await?;
        }
        Commands::Backtest {
            symbol,
            start_date,
            end_date,
            interval,
            balance,
            indicator,
            rule,
        } => {
            let config = strategy_config(indicator, rule, settings.strategies.backtest);
            handle_backtest(settings, symbol, start_date, end_date, interval, balance, config)
                .await?;
        }
        Commands::Signals {
            symbol,
            interval,
            indicator,
            rule,
        } => {
            let config = strategy_config(indicator, rule, settings.strategies.timing);
            handle_signals(settings, symbol, interval, config).await?;
        }
    }

    tracing::info!("Atlas has finished successfully.");

    Ok(())
}

/// Fills in whatever half of the pairing the user left out. A lone indicator
/// gets the rule it supports, a lone rule keeps the configured indicator when
/// that indicator supports it.
fn strategy_config(
    indicator: Option<IndicatorKind>,
    rule: Option<DetectionRule>,
    configured: StrategyConfig,
) -> StrategyConfig {
    match (indicator, rule) {
        (Some(indicator), Some(rule)) => StrategyConfig::new(indicator, rule),
        (Some(indicator), None) => StrategyConfig::new(indicator, default_rule(indicator)),
        (None, Some(rule)) if default_rule(configured.indicator) == rule => {
            StrategyConfig::new(configured.indicator, rule)
        }
        (None, Some(DetectionRule::Overbought)) => {
            StrategyConfig::new(IndicatorKind::Rsi, DetectionRule::Overbought)
        }
        (None, Some(DetectionRule::Crossover)) => {
            StrategyConfig::new(IndicatorKind::Macd, DetectionRule::Crossover)
        }
        (None, None) => configured,
    }
}

fn default_rule(indicator: IndicatorKind) -> DetectionRule {
    match indicator {
        IndicatorKind::Rsi => DetectionRule::Overbought,
        IndicatorKind::Sma | IndicatorKind::Macd => DetectionRule::Crossover,
    }
}

fn symbol_from_arg(symbol: &str) -> Symbol {
    Symbol(symbol.trim().to_uppercase())
}

// --- "Run" Subcommand Logic ---

async fn handle_run(
    settings: Settings,
    symbol: String,
    runtime: Runtime,
    interval: Option<String>,
    initial_state: Option<Side>,
    paper: bool,
) -> Result<()> {
    let symbol = symbol_from_arg(&symbol);
    let mut bot = settings.bot.clone();
    if let Some(interval) = interval {
        bot.interval = interval;
    }
    let first_action = initial_state.unwrap_or(bot.initial_state);

    let strategies = engine::create_live_strategies(&settings.strategies)?;
    let sizing = TieredSizing::new(settings.sizing.clone())
        .context("Invalid sizing tiers")?;
    let feed = RestKlineFeed::new(&settings.binance)?;

    let executor: Box<dyn Executor> = if paper {
        let rules = ApiClient::new(&settings.binance)?
            .symbol_rules(&symbol)
            .await
            .with_context(|| format!("Failed to load trading rules for {symbol}"))?;
        let simulated = SimulatedExecutor::new(SimulationSettings {
            base_asset: rules.base_asset,
            quote_asset: rules.quote_asset,
            base_balance: settings.paper.base_balance,
            quote_balance: settings.paper.quote_balance,
            taker_fee: settings.paper.taker_fee,
            min_notional: settings.paper.min_notional,
        })?;
        Box::new(simulated)
    } else {
        if !settings.binance.has_credentials() {
            anyhow::bail!(
                "Live trading needs APP_BINANCE__API_KEY and APP_BINANCE__SECRET_KEY; pass --paper to simulate"
            );
        }
        tracing::warn!("LIVE TRADING IS ENABLED. REAL ORDERS WILL BE PLACED.");
        let top_up = settings.fee_topup.enabled.then(|| FeeTopUp {
            asset: settings.fee_topup.asset.clone(),
            min_balance: settings.fee_topup.min_balance,
            amount: settings.fee_topup.top_up_amount,
        });
        Box::new(LiveExecutor::connect(&settings.binance, symbol.clone(), top_up).await?)
    };

    tracing::info!(
        symbol = %symbol,
        interval = %bot.interval,
        runtime = %runtime,
        first_action = %first_action,
        executor = executor.name(),
        "Starting trading task."
    );

    let mut task = TradingTask::new(
        symbol,
        TaskSettings::from(&bot),
        Box::new(feed),
        strategies,
        PositionController::new(sizing),
        executor,
    )?;
    let final_position = task
        .run(Position::new(Phase::awaiting(first_action)), runtime.as_duration())
        .await;

    tracing::info!(
        next_action = %final_position.expected_action(),
        entry_price = ?final_position.entry_price,
        "Trading task finished."
    );
    Ok(())
}

// --- "Backtest" Subcommand Logic ---

async fn handle_backtest(
    settings: Settings,
    symbol: String,
    start_date: String,
    end_date: String,
    interval: Option<String>,
    balance: Option<Decimal>,
    config: StrategyConfig,
) -> Result<()> {
    let symbol = symbol_from_arg(&symbol);
    let interval = interval.unwrap_or_else(|| settings.bot.interval.clone());
    let start = history::day_start_millis(&start_date)?;
    let end = history::day_end_millis(&end_date)?;
    if end < start {
        anyhow::bail!("End date {end_date} is before start date {start_date}");
    }

    let strategy = strategies::create_strategy(&config, &settings.strategies.indicators)?;
    let api_client = api_client::new(&settings.binance)?;

    // Fetch enough bars before the window for the indicators to be defined at its start.
    let fetch_start = match history::interval_millis(&interval) {
        Some(bar) => start - bar * strategy.warmup() as i64,
        None => {
            tracing::warn!(interval, "Unknown interval length; the window starts without warm-up bars.");
            start
        }
    };

    tracing::info!(
        symbol = %symbol,
        interval,
        strategy = %config,
        from = %Utc.timestamp_millis_opt(start).single().unwrap_or_default(),
        to = %Utc.timestamp_millis_opt(end).single().unwrap_or_default(),
        "Starting backtest."
    );

    let page_limit = settings.backtest.page_limit;
    let (client, pair, bars) = (&api_client, &symbol, interval.as_str());
    let klines = history::fetch_klines(
        move |from| async move {
            client
                .get_klines(pair, bars, Some(from), Some(end), Some(page_limit))
                .await
                .map_err(anyhow::Error::from)
        },
        fetch_start,
        end,
        page_limit,
    )
    .await?;

    if klines.is_empty() {
        tracing::warn!("No historical klines found for the requested window.");
    }

    let backtester = Backtester::new(
        BacktestWindow::new(start, end),
        balance.unwrap_or(settings.backtest.initial_balance),
    );
    let report = backtester.run_strategy(strategy.as_ref(), &klines);
    backtester::print_report(&report);

    Ok(())
}

// --- "Signals" Subcommand Logic ---

async fn handle_signals(
    settings: Settings,
    symbol: String,
    interval: Option<String>,
    config: StrategyConfig,
) -> Result<()> {
    let symbol = symbol_from_arg(&symbol);
    let interval = interval.unwrap_or_else(|| settings.bot.interval.clone());
    let strategy = strategies::create_strategy(&config, &settings.strategies.indicators)?;
    let api_client = api_client::new(&settings.binance)?;

    let klines = api_client
        .get_klines(&symbol, &interval, None, None, Some(settings.bot.kline_limit))
        .await?;
    let events = strategy.signals(&klines);
    tracing::info!(
        symbol = %symbol,
        strategy = %config,
        klines = klines.len(),
        events = events.len(),
        "Computed signals."
    );

    for event in &events {
        let time = Utc
            .timestamp_millis_opt(event.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| event.timestamp.to_string());
        println!(
            "{time}  {:<4} @ {}  ({} {:.2})",
            event.action, event.price, config.indicator, event.indicator_value
        );
    }

    Ok(())
}
