// In crates/core-types/src/types.rs

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading pair as the exchange names it (e.g., "ETHUSDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single candlestick. Signal logic only ever reads `close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// Open time in milliseconds since the epoch; this is the bar's timestamp.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
}

/// The direction of a signal, an order or a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(Error::UnknownSide(s.to_string())),
        }
    }
}

/// What the controller is waiting for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Flat; the next valid action is a BUY.
    #[default]
    AwaitingEntry,
    /// Holding; the next valid action is a SELL.
    AwaitingExit,
}

impl Phase {
    /// The phase whose next valid action is `side`.
    pub fn awaiting(side: Side) -> Self {
        match side {
            Side::Buy => Phase::AwaitingEntry,
            Side::Sell => Phase::AwaitingExit,
        }
    }

    pub fn expected_action(self) -> Side {
        match self {
            Phase::AwaitingEntry => Side::Buy,
            Phase::AwaitingExit => Side::Sell,
        }
    }
}

/// The controller's position for one pair. It is a plain value: callers own it
/// and replace it with the result of [`Position::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub phase: Phase,
    /// Price of the BUY that opened the current holding, if any.
    pub entry_price: Option<Decimal>,
}

impl Position {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            entry_price: None,
        }
    }

    pub fn expected_action(&self) -> Side {
        self.phase.expected_action()
    }

    /// Returns the position after an accepted `side` at `price`.
    ///
    /// A side that does not match the current phase leaves the position untouched.
    pub fn advance(self, side: Side, price: Decimal) -> Self {
        match (self.phase, side) {
            (Phase::AwaitingEntry, Side::Buy) => Self {
                phase: Phase::AwaitingExit,
                entry_price: Some(price),
            },
            (Phase::AwaitingExit, Side::Sell) => Self {
                phase: Phase::AwaitingEntry,
                entry_price: None,
            },
            _ => self,
        }
    }
}

/// A detection event emitted by a strategy at one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEvent {
    /// Open time of the bar the event fired on.
    pub timestamp: i64,
    /// The indicator reading that triggered the event.
    pub indicator_value: f64,
    pub action: Side,
    /// Close price of the bar.
    pub price: Decimal,
}

/// One simulated trade in a backtest ledger. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub timestamp: i64,
    pub price: Decimal,
    pub side: Side,
}

/// A market order sized as a percentage of the relevant free balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    /// 0 < percentage <= 100. BUYs spend quote, SELLs spend base.
    pub percentage: Decimal,
}

/// Free balances of both assets of a pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balances {
    pub base_asset: String,
    pub base: Decimal,
    pub quote_asset: String,
    pub quote: Decimal,
}

/// The details of a completely filled market order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub symbol: Symbol,
    pub side: Side,
    pub order_id: Option<i64>,
    /// Average fill price.
    pub price: Decimal,
    /// Filled quantity in the base asset.
    pub quantity: Decimal,
    /// Quote asset transacted.
    pub quote_quantity: Decimal,
    pub fee: Decimal,
}

/// Why an order was not placed, or was refused by the exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DeclineReason {
    InsufficientBalance {
        asset: String,
    },
    BelowMinNotional {
        notional: Decimal,
        minimum: Decimal,
    },
    ExchangeRejected {
        code: i64,
        message: String,
    },
    /// The exchange accepted the order but executed none of it (e.g. `EXPIRED`).
    NotFilled {
        order_id: i64,
        status: String,
    },
    /// The order could not be built or submitted and retrying will not help.
    Invalid {
        message: String,
    },
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::InsufficientBalance { asset } => {
                write!(f, "insufficient {asset} balance")
            }
            DeclineReason::BelowMinNotional { notional, minimum } => {
                write!(f, "order value {notional} is below the minimum notional {minimum}")
            }
            DeclineReason::ExchangeRejected { code, message } => {
                write!(f, "rejected by exchange (code {code}): {message}")
            }
            DeclineReason::NotFilled { order_id, status } => {
                write!(f, "order {order_id} ended {status} with nothing executed")
            }
            DeclineReason::Invalid { message } => write!(f, "invalid order: {message}"),
        }
    }
}

/// The result of handing an order to an executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OrderOutcome {
    Filled(Fill),
    /// A non-exceptional refusal: balance, minimum size or exchange-side rejection.
    Declined { reason: DeclineReason },
    /// Network trouble; the order may be retried on a later tick.
    TransientFailure { reason: String },
}

impl OrderOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, OrderOutcome::Filled(_))
    }
}
