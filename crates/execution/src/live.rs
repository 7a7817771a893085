// In crates/execution/src/live.rs

use crate::types::FeeTopUp;
use crate::{Executor, Result, share_of};
use api_client::{ApiClient, NewOrderResponse, SymbolRules};
use app_config::types::BinanceSettings;
use async_trait::async_trait;
use core_types::{Balances, DeclineReason, Fill, OrderOutcome, OrderRequest, Side, Symbol};
use rust_decimal::Decimal;

/// Fee-asset pair (e.g. BNBBUSD) and its rules, resolved at connect time.
#[derive(Debug, Clone)]
struct TopUpMarket {
    config: FeeTopUp,
    symbol: Symbol,
    rules: SymbolRules,
}

/// An executor that places real market orders on Binance Spot.
#[derive(Debug, Clone)]
pub struct LiveExecutor {
    /// Kept so the HTTP client can be rebuilt on `reconnect`.
    settings: BinanceSettings,
    /// The API client for communicating with Binance.
    api_client: ApiClient,
    symbol: Symbol,
    rules: SymbolRules,
    top_up: Option<TopUpMarket>,
}

impl LiveExecutor {
    /// Creates a `LiveExecutor` for `symbol`, loading its trading rules.
    pub async fn connect(
        settings: &BinanceSettings,
        symbol: Symbol,
        top_up: Option<FeeTopUp>,
    ) -> Result<Self> {
        let api_client = ApiClient::new(settings)?;
        let rules = api_client.symbol_rules(&symbol).await?;
        tracing::info!(
            symbol = %symbol,
            tick_size = %rules.tick_size,
            step_size = %rules.step_size,
            min_notional = %rules.min_notional,
            "Loaded symbol trading rules."
        );

        let top_up = match top_up {
            Some(config) => {
                let fee_symbol = Symbol(format!("{}{}", config.asset, rules.quote_asset));
                let fee_rules = api_client.symbol_rules(&fee_symbol).await?;
                Some(TopUpMarket {
                    config,
                    symbol: fee_symbol,
                    rules: fee_rules,
                })
            }
            None => None,
        };

        Ok(Self {
            settings: settings.clone(),
            api_client,
            symbol,
            rules,
            top_up,
        })
    }

    /// Keeps the fee asset topped up. Failures are logged and never block the
    /// order that follows.
    async fn top_up_fee_asset(&self) {
        let Some(market) = &self.top_up else {
            return;
        };

        let free = match self.api_client.account().await {
            Ok(account) => account.free(&market.config.asset),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read fee asset balance; skipping top-up.");
                return;
            }
        };
        if free >= market.config.min_balance {
            return;
        }

        let quantity = market.rules.round_quantity(market.config.amount);
        match self
            .api_client
            .market_order_quantity(&market.symbol, Side::Buy, quantity)
            .await
        {
            Ok(_) => tracing::info!(
                asset = %market.config.asset,
                %quantity,
                previous_balance = %free,
                "Topped up fee asset."
            ),
            Err(e) => tracing::warn!(error = %e, asset = %market.config.asset, "Fee asset top-up failed."),
        }
    }

    async fn place(&self, order: &OrderRequest) -> api_client::Result<OrderOutcome> {
        let balances = self.api_client.balances(&self.rules).await?;

        let response = match order.side {
            Side::Buy => {
                let amount = self.rules.round_quote(share_of(balances.quote, order.percentage));
                if let Some(reason) = self.check_size(amount, &balances.quote_asset) {
                    return Ok(OrderOutcome::Declined { reason });
                }
                self.top_up_fee_asset().await;
                self.api_client.market_buy_quote(&self.symbol, amount).await?
            }
            Side::Sell => {
                let quantity = self.rules.round_quantity(share_of(balances.base, order.percentage));
                if quantity.is_zero() {
                    return Ok(OrderOutcome::Declined {
                        reason: DeclineReason::InsufficientBalance {
                            asset: balances.base_asset,
                        },
                    });
                }
                let avg_price = self.api_client.avg_price(&self.symbol).await?;
                if let Some(reason) = self.check_size(quantity * avg_price, &balances.base_asset) {
                    return Ok(OrderOutcome::Declined { reason });
                }
                self.top_up_fee_asset().await;
                self.api_client
                    .market_order_quantity(&self.symbol, Side::Sell, quantity)
                    .await?
            }
        };

        Ok(outcome_from_response(&self.symbol, order.side, response))
    }

    fn check_size(&self, notional: Decimal, asset: &str) -> Option<DeclineReason> {
        if notional.is_zero() {
            return Some(DeclineReason::InsufficientBalance {
                asset: asset.to_string(),
            });
        }
        (notional < self.rules.min_notional).then(|| DeclineReason::BelowMinNotional {
            notional,
            minimum: self.rules.min_notional,
        })
    }
}

/// Only a completely filled order with a non-zero executed quantity is a fill.
/// Anything else the exchange reports back leaves the position untouched.
pub(crate) fn outcome_from_response(
    symbol: &Symbol,
    side: Side,
    response: NewOrderResponse,
) -> OrderOutcome {
    if response.status != "FILLED" || response.executed_qty <= Decimal::ZERO {
        tracing::warn!(
            symbol = %symbol,
            order_id = response.order_id,
            status = %response.status,
            executed_qty = %response.executed_qty,
            "Order was not filled."
        );
        return OrderOutcome::Declined {
            reason: DeclineReason::NotFilled {
                order_id: response.order_id,
                status: response.status,
            },
        };
    }

    OrderOutcome::Filled(Fill {
        symbol: symbol.clone(),
        side,
        order_id: Some(response.order_id),
        price: response.average_price(),
        quantity: response.executed_qty,
        quote_quantity: response.cummulative_quote_qty,
        fee: response.total_commission(),
    })
}

/// Maps a client error onto an outcome: anything retrying could fix is a
/// transient failure, everything else a decline.
pub(crate) fn outcome_from_error(error: api_client::Error) -> OrderOutcome {
    if error.is_transient() {
        return OrderOutcome::TransientFailure {
            reason: error.to_string(),
        };
    }
    let reason = match error {
        api_client::Error::ApiError { code, msg } => DeclineReason::ExchangeRejected { code, message: msg },
        other => DeclineReason::Invalid {
            message: other.to_string(),
        },
    };
    OrderOutcome::Declined { reason }
}

#[async_trait]
impl Executor for LiveExecutor {
    fn name(&self) -> &'static str {
        "LiveExecutor"
    }

    async fn balances(&self) -> Result<Balances> {
        Ok(self.api_client.balances(&self.rules).await?)
    }

    async fn execute(&mut self, order_request: &OrderRequest, _current_price: Decimal) -> OrderOutcome {
        tracing::info!(?order_request, "Executing live order request...");
        if order_request.symbol != self.symbol {
            tracing::warn!(
                expected = %self.symbol,
                requested = %order_request.symbol,
                "Order symbol does not match the executor's symbol."
            );
        }

        match self.place(order_request).await {
            Ok(outcome) => outcome,
            Err(e) => outcome_from_error(e),
        }
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.api_client = ApiClient::new(&self.settings)?;
        tracing::info!(symbol = %self.symbol, "API client re-created.");
        Ok(())
    }
}
