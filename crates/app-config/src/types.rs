// In crates/app-config/src/types.rs

use core_types::{DetectionRule, IndicatorKind, Side, StrategyConfig};
use risk::types::TieredSizingSettings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use strategies::types::IndicatorSettings;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Settings for the Binance API.
    #[serde(default)]
    pub binance: BinanceSettings,
    /// Cadence and defaults of the live loop.
    #[serde(default)]
    pub bot: BotSettings,
    /// Which strategies time and size trades, and their indicator parameters.
    #[serde(default)]
    pub strategies: StrategySettings,
    /// Tier table used to size live orders.
    #[serde(default)]
    pub sizing: TieredSizingSettings,
    /// Fee-currency top-up before live orders.
    #[serde(default)]
    pub fee_topup: FeeTopUpSettings,
    /// Balances and fees of the paper-trading executor.
    #[serde(default)]
    pub paper: PaperSettings,
    #[serde(default)]
    pub backtest: BacktestSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BinanceSettings {
    /// The API key for Binance.
    pub api_key: String,
    /// The secret key for Binance.
    pub secret_key: String,
    /// The REST API base URL for Binance.
    pub rest_base_url: String,
    /// Upper bound for a single HTTP request.
    pub request_timeout_secs: u64,
    pub recv_window_ms: u64,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            rest_base_url: "https://api.binance.com".to_string(),
            request_timeout_secs: 10,
            recv_window_ms: 5000,
        }
    }
}

impl BinanceSettings {
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty()
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BotSettings {
    /// Kline interval, e.g. "1m" or "1h".
    pub interval: String,
    /// Klines fetched per tick. Indicators need enough history to warm up.
    pub kline_limit: u16,
    /// Pause between ticks.
    pub poll_interval_secs: u64,
    /// Wall-clock period after which the executor reconnects.
    pub reset_interval_secs: u64,
    /// The first action the bot looks for.
    pub initial_state: Side,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            interval: "1m".to_string(),
            kline_limit: 300,
            poll_interval_secs: 10,
            reset_interval_secs: 3600,
            initial_state: Side::Buy,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StrategySettings {
    /// Crossover strategy whose latest event decides when to trade.
    pub timing: StrategyConfig,
    /// Threshold strategy whose latest reading decides how much to trade.
    pub sizing: StrategyConfig,
    /// Strategy replayed by the `backtest` command unless overridden.
    pub backtest: StrategyConfig,
    pub indicators: IndicatorSettings,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            timing: StrategyConfig::new(IndicatorKind::Macd, DetectionRule::Crossover),
            sizing: StrategyConfig::new(IndicatorKind::Rsi, DetectionRule::Overbought),
            backtest: StrategyConfig::new(IndicatorKind::Macd, DetectionRule::Crossover),
            indicators: IndicatorSettings::default(),
        }
    }
}

/// Keeps a small balance of the fee asset so commissions are paid at the
/// discounted rate.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FeeTopUpSettings {
    pub enabled: bool,
    pub asset: String,
    /// Top up when the free balance falls below this amount.
    pub min_balance: Decimal,
    /// Quantity of the fee asset bought per top-up.
    pub top_up_amount: Decimal,
}

impl Default for FeeTopUpSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            asset: "BNB".to_string(),
            min_balance: dec!(0.004),
            top_up_amount: dec!(0.003),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PaperSettings {
    pub base_balance: Decimal,
    pub quote_balance: Decimal,
    /// Taker fee charged on every fill, as a fraction (0.001 = 0.1%).
    pub taker_fee: Decimal,
    pub min_notional: Decimal,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            base_balance: Decimal::ZERO,
            quote_balance: dec!(1000),
            taker_fee: dec!(0.001),
            min_notional: dec!(10),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BacktestSettings {
    pub initial_balance: Decimal,
    /// Klines requested per history page.
    pub page_limit: u16,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_balance: dec!(1000),
            page_limit: 1000,
        }
    }
}
