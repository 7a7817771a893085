// In crates/api-client/src/types.rs

use crate::{Error, Result};
use core_types::Kline;
use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::str::FromStr;

/// The main client for interacting with the Binance Spot API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    /// The user's Binance API key.
    pub api_key: String,
    /// The user's Binance secret key.
    pub secret_key: String,
    /// The base URL for the Binance Spot API.
    pub base_url: String,
    /// `recvWindow` sent with signed requests, in milliseconds.
    pub recv_window_ms: u64,
}

/// Temporary struct to deserialize the kline response from Binance,
/// which is a JSON array of mixed types.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,         // 0: Open time
    pub String,      // 1: Open
    pub String,      // 2: High
    pub String,      // 3: Low
    pub String,      // 4: Close
    pub String,      // 5: Volume
    pub i64,         // 6: Close time
    pub String,      // 7: Quote asset volume
    pub i64,         // 8: Number of trades
    pub String,      // 9: Taker buy base asset volume
    pub String,      // 10: Taker buy quote asset volume
    pub String,      // 11: Ignore
);

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

impl TryFrom<RawKline> for Kline {
    type Error = Error;

    fn try_from(raw: RawKline) -> Result<Self> {
        Ok(Kline {
            open_time: raw.0,
            open: parse_decimal("open", &raw.1)?,
            high: parse_decimal("high", &raw.2)?,
            low: parse_decimal("low", &raw.3)?,
            close: parse_decimal("close", &raw.4)?,
            volume: parse_decimal("volume", &raw.5)?,
            close_time: raw.6,
        })
    }
}

/// `GET /api/v3/exchangeInfo` envelope.
#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub filters: Vec<SymbolFilter>,
}

/// The trading filters the executor needs; every other filter type is
/// collapsed into `Other`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER")]
    PriceFilter {
        #[serde(rename = "tickSize")]
        tick_size: Decimal,
    },
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "stepSize")]
        step_size: Decimal,
    },
    #[serde(rename = "MIN_NOTIONAL")]
    MinNotional {
        #[serde(rename = "minNotional")]
        min_notional: Decimal,
    },
    #[serde(rename = "NOTIONAL")]
    Notional {
        #[serde(rename = "minNotional")]
        min_notional: Decimal,
    },
    #[serde(other)]
    Other,
}

impl SymbolInfo {
    /// Extracts the rounding and minimum-size rules for this symbol.
    pub fn rules(&self) -> Result<SymbolRules> {
        let missing = |filter| Error::MissingFilter {
            symbol: self.symbol.clone(),
            filter,
        };

        let tick_size = self
            .filters
            .iter()
            .find_map(|f| match f {
                SymbolFilter::PriceFilter { tick_size } => Some(*tick_size),
                _ => None,
            })
            .ok_or_else(|| missing("PRICE_FILTER"))?;
        let step_size = self
            .filters
            .iter()
            .find_map(|f| match f {
                SymbolFilter::LotSize { step_size } => Some(*step_size),
                _ => None,
            })
            .ok_or_else(|| missing("LOT_SIZE"))?;
        let min_notional = self
            .filters
            .iter()
            .find_map(|f| match f {
                SymbolFilter::MinNotional { min_notional } | SymbolFilter::Notional { min_notional } => {
                    Some(*min_notional)
                }
                _ => None,
            })
            .ok_or_else(|| missing("MIN_NOTIONAL"))?;

        Ok(SymbolRules {
            symbol: self.symbol.clone(),
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
            tick_size,
            step_size,
            min_notional,
        })
    }
}

/// Precision and minimum-size rules of one trading pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRules {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub tick_size: Decimal,
    pub step_size: Decimal,
    pub min_notional: Decimal,
}

impl SymbolRules {
    /// Decimal places allowed for quote amounts (from the price tick).
    pub fn quote_precision(&self) -> u32 {
        self.tick_size.normalize().scale()
    }

    /// Decimal places allowed for base quantities (from the lot step).
    pub fn quantity_precision(&self) -> u32 {
        self.step_size.normalize().scale()
    }

    /// Rounds a quote amount down to the allowed precision so an order never
    /// asks for more than the free balance.
    pub fn round_quote(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.quote_precision(), RoundingStrategy::ToZero)
    }

    pub fn round_quantity(&self, quantity: Decimal) -> Decimal {
        quantity.round_dp_with_strategy(self.quantity_precision(), RoundingStrategy::ToZero)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AssetBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

/// `GET /api/v3/account`, reduced to balances.
#[derive(Debug, Deserialize, Clone)]
pub struct AccountInfo {
    pub balances: Vec<AssetBalance>,
}

impl AccountInfo {
    /// Free balance of `asset`; an asset the account never held counts as zero.
    pub fn free(&self, asset: &str) -> Decimal {
        self.balances
            .iter()
            .find(|b| b.asset == asset)
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }
}

/// `GET /api/v3/avgPrice`.
#[derive(Debug, Deserialize, Clone)]
pub struct AvgPrice {
    pub mins: i64,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderFill {
    pub price: Decimal,
    pub qty: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
}

/// `POST /api/v3/order` with `newOrderRespType=FULL`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    pub symbol: String,
    pub order_id: i64,
    pub status: String,
    pub side: String,
    pub executed_qty: Decimal,
    /// Binance spells it this way.
    pub cummulative_quote_qty: Decimal,
    #[serde(default)]
    pub fills: Vec<OrderFill>,
}

impl NewOrderResponse {
    /// Volume-weighted fill price, or zero if nothing was executed.
    pub fn average_price(&self) -> Decimal {
        self.cummulative_quote_qty
            .checked_div(self.executed_qty)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_commission(&self) -> Decimal {
        self.fills.iter().map(|f| f.commission).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const EXCHANGE_INFO: &str = r#"{
        "timezone": "UTC",
        "symbols": [{
            "symbol": "ETHBUSD",
            "status": "TRADING",
            "baseAsset": "ETH",
            "quoteAsset": "BUSD",
            "filters": [
                {"filterType": "PRICE_FILTER", "minPrice": "0.01000000", "maxPrice": "1000000.00000000", "tickSize": "0.01000000"},
                {"filterType": "PERCENT_PRICE", "multiplierUp": "5", "multiplierDown": "0.2", "avgPriceMins": 5},
                {"filterType": "LOT_SIZE", "minQty": "0.00010000", "maxQty": "9000.00000000", "stepSize": "0.00010000"},
                {"filterType": "NOTIONAL", "minNotional": "10.00000000", "applyMinToMarket": true, "maxNotional": "9000000.00000000", "applyMaxToMarket": false, "avgPriceMins": 5}
            ]
        }]
    }"#;

    fn rules() -> SymbolRules {
        let info: ExchangeInfo = serde_json::from_str(EXCHANGE_INFO).unwrap();
        info.symbols[0].rules().unwrap()
    }

    #[test]
    fn extracts_filters() {
        let rules = rules();
        assert_eq!(rules.base_asset, "ETH");
        assert_eq!(rules.quote_asset, "BUSD");
        assert_eq!(rules.tick_size, dec!(0.01));
        assert_eq!(rules.step_size, dec!(0.0001));
        assert_eq!(rules.min_notional, dec!(10));
    }

    #[test]
    fn precision_follows_filter_sizes() {
        let rules = rules();
        assert_eq!(rules.quote_precision(), 2);
        assert_eq!(rules.quantity_precision(), 4);
        assert_eq!(rules.round_quote(dec!(12.3456)), dec!(12.34));
        assert_eq!(rules.round_quantity(dec!(0.123456789)), dec!(0.1234));
    }

    #[test]
    fn missing_filter_is_reported() {
        let info = SymbolInfo {
            symbol: "ETHBUSD".into(),
            base_asset: "ETH".into(),
            quote_asset: "BUSD".into(),
            filters: vec![SymbolFilter::PriceFilter {
                tick_size: dec!(0.01),
            }],
        };
        assert!(matches!(
            info.rules(),
            Err(Error::MissingFilter { filter: "LOT_SIZE", .. })
        ));
    }

    #[test]
    fn raw_kline_converts() {
        let raw: RawKline = serde_json::from_str(
            r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]"#,
        )
        .unwrap();
        let kline = Kline::try_from(raw).unwrap();
        assert_eq!(kline.open_time, 1499040000000);
        assert_eq!(kline.close, dec!(0.01577100));
        assert_eq!(kline.close_time, 1499644799999);
    }

    #[test]
    fn order_response_averages_fills() {
        let response: NewOrderResponse = serde_json::from_str(
            r#"{"symbol":"ETHBUSD","orderId":28,"status":"FILLED","side":"BUY",
                "executedQty":"0.0100","cummulativeQuoteQty":"20.00",
                "fills":[{"price":"2000.00","qty":"0.0100","commission":"0.00001","commissionAsset":"BNB","tradeId":56}]}"#,
        )
        .unwrap();
        assert_eq!(response.average_price(), dec!(2000));
        assert_eq!(response.total_commission(), dec!(0.00001));
    }

    #[test]
    fn account_defaults_unknown_asset_to_zero() {
        let account: AccountInfo = serde_json::from_str(
            r#"{"balances":[{"asset":"BUSD","free":"150.5","locked":"0"}]}"#,
        )
        .unwrap();
        assert_eq!(account.free("BUSD"), dec!(150.5));
        assert_eq!(account.free("ETH"), Decimal::ZERO);
    }
}
