// In crates/api-client/src/lib.rs

use app_config::types::BinanceSettings;
use chrono::Utc;
use core_types::{Balances, Kline, Side, Symbol};
use hmac::{Hmac, Mac};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// Generates an HMAC-SHA256 signature for a given query string, hex encoded.
pub fn sign_query(secret_key: &str, query_string: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| Error::Signing(e.to_string()))?;
    mac.update(query_string.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Turns a Binance response body into `T`, surfacing `{"code", "msg"}`
/// error objects as [`Error::ApiError`].
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)?;
    if let Some(code) = value.get("code").and_then(Value::as_i64) {
        if code != 0 {
            let msg = value
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(Error::ApiError { code, msg });
        }
    }
    Ok(serde_json::from_value(value)?)
}

impl ApiClient {
    /// Constructs a new ApiClient from BinanceSettings.
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            api_key: settings.api_key.clone(),
            secret_key: settings.secret_key.clone(),
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
            recv_window_ms: settings.recv_window_ms,
        })
    }

    /// Appends `recvWindow`, `timestamp` and `signature` to `params`.
    fn create_signed_query(&self, params: &mut String) -> Result<()> {
        let timestamp = Utc::now().timestamp_millis();

        if !params.is_empty() {
            params.push('&');
        }
        params.push_str(&format!(
            "recvWindow={}&timestamp={}",
            self.recv_window_ms, timestamp
        ));

        let signature = sign_query(&self.secret_key, params)?;
        params.push_str(&format!("&signature={}", signature));
        Ok(())
    }

    async fn public_get<T: DeserializeOwned>(&self, path: &str, params: &str) -> Result<T> {
        let url = format!("{}{}?{}", self.base_url, path, params);
        let body = self.http_client.get(&url).send().await?.text().await?;
        parse_response(&body)
    }

    async fn signed_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        mut params: String,
    ) -> Result<T> {
        self.create_signed_query(&mut params)?;
        let url = format!("{}{}?{}", self.base_url, path, params);

        let body = self
            .http_client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?
            .text()
            .await?;
        parse_response(&body)
    }

    /// Fetches kline (candlestick) data, oldest first.
    ///
    /// This corresponds to the `GET /api/v3/klines` endpoint.
    ///
    /// # Arguments
    ///
    /// * `symbol`: The symbol to fetch klines for.
    /// * `interval`: The kline interval (e.g., "1m", "5m", "1h").
    /// * `start_time` / `end_time`: Optional bounds in milliseconds.
    /// * `limit`: Optional number of klines to return (max 1000, default 500).
    pub async fn get_klines(
        &self,
        symbol: &Symbol,
        interval: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u16>,
    ) -> Result<Vec<Kline>> {
        let mut params = format!("symbol={}&interval={}", symbol.0, interval);
        if let Some(st) = start_time {
            params.push_str(&format!("&startTime={}", st));
        }
        if let Some(et) = end_time {
            params.push_str(&format!("&endTime={}", et));
        }
        if let Some(l) = limit {
            params.push_str(&format!("&limit={}", l));
        }

        let raw_klines: Vec<RawKline> = self.public_get("/api/v3/klines", &params).await?;
        raw_klines.into_iter().map(Kline::try_from).collect()
    }

    /// Listing details for one symbol. Corresponds to `GET /api/v3/exchangeInfo`.
    pub async fn symbol_info(&self, symbol: &Symbol) -> Result<SymbolInfo> {
        let info: ExchangeInfo = self
            .public_get("/api/v3/exchangeInfo", &format!("symbol={}", symbol.0))
            .await?;
        info.symbols
            .into_iter()
            .find(|s| s.symbol == symbol.0)
            .ok_or_else(|| Error::UnknownSymbol(symbol.0.clone()))
    }

    pub async fn symbol_rules(&self, symbol: &Symbol) -> Result<SymbolRules> {
        self.symbol_info(symbol).await?.rules()
    }

    /// Current 5-minute average price. Corresponds to `GET /api/v3/avgPrice`.
    pub async fn avg_price(&self, symbol: &Symbol) -> Result<Decimal> {
        let avg: AvgPrice = self
            .public_get("/api/v3/avgPrice", &format!("symbol={}", symbol.0))
            .await?;
        Ok(avg.price)
    }

    /// Fetches the spot account balances. Corresponds to `GET /api/v3/account`.
    pub async fn account(&self) -> Result<AccountInfo> {
        self.signed_request(Method::GET, "/api/v3/account", String::new())
            .await
    }

    /// Free balances of both assets of `rules`' pair.
    pub async fn balances(&self, rules: &SymbolRules) -> Result<Balances> {
        let account = self.account().await?;
        Ok(Balances {
            base_asset: rules.base_asset.clone(),
            base: account.free(&rules.base_asset),
            quote_asset: rules.quote_asset.clone(),
            quote: account.free(&rules.quote_asset),
        })
    }

    /// Market buy spending `quote_quantity` of the quote asset.
    /// Corresponds to `POST /api/v3/order` with `quoteOrderQty`.
    pub async fn market_buy_quote(
        &self,
        symbol: &Symbol,
        quote_quantity: Decimal,
    ) -> Result<NewOrderResponse> {
        self.market_order(symbol, Side::Buy, "quoteOrderQty", quote_quantity)
            .await
    }

    /// Market order for `quantity` of the base asset.
    /// Corresponds to `POST /api/v3/order` with `quantity`.
    pub async fn market_order_quantity(
        &self,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
    ) -> Result<NewOrderResponse> {
        self.market_order(symbol, side, "quantity", quantity).await
    }

    async fn market_order(
        &self,
        symbol: &Symbol,
        side: Side,
        size_param: &str,
        size: Decimal,
    ) -> Result<NewOrderResponse> {
        let params = format!(
            "symbol={}&side={}&type=MARKET&{}={}&newOrderRespType=FULL",
            symbol.0,
            side,
            size_param,
            size.normalize()
        );
        tracing::debug!(symbol = %symbol, %side, size_param, size = %size, "Placing market order.");
        self.signed_request(Method::POST, "/api/v3/order", params)
            .await
    }
}

// Free function to allow api_client::new usage
pub fn new(settings: &BinanceSettings) -> Result<ApiClient> {
    ApiClient::new(settings)
}
