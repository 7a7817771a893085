// In crates/execution/src/simulated.rs

use crate::types::SimulationSettings;
use crate::{Error, Executor, Result, share_of};
use async_trait::async_trait;
use core_types::{Balances, DeclineReason, Fill, OrderOutcome, OrderRequest, Side};
use rust_decimal::Decimal;

/// Paper-trading executor: fills every order at the price it is handed,
/// against balances kept in memory.
#[derive(Debug)]
pub struct SimulatedExecutor {
    settings: SimulationSettings,
    base: Decimal,
    quote: Decimal,
    next_order_id: i64,
}

impl SimulatedExecutor {
    pub fn new(settings: SimulationSettings) -> Result<Self> {
        if settings.taker_fee < Decimal::ZERO || settings.taker_fee >= Decimal::ONE {
            return Err(Error::InvalidSettings(format!(
                "taker fee {} must be in [0, 1)",
                settings.taker_fee
            )));
        }
        if settings.base_balance < Decimal::ZERO || settings.quote_balance < Decimal::ZERO {
            return Err(Error::InvalidSettings("balances cannot be negative".to_string()));
        }

        Ok(Self {
            base: settings.base_balance,
            quote: settings.quote_balance,
            settings,
            next_order_id: 1,
        })
    }

    fn declined(reason: DeclineReason) -> OrderOutcome {
        tracing::debug!(%reason, "Simulated order declined.");
        OrderOutcome::Declined { reason }
    }

    fn check_size(&self, notional: Decimal, asset: &str) -> Option<DeclineReason> {
        if notional.is_zero() {
            return Some(DeclineReason::InsufficientBalance {
                asset: asset.to_string(),
            });
        }
        (notional < self.settings.min_notional).then(|| DeclineReason::BelowMinNotional {
            notional,
            minimum: self.settings.min_notional,
        })
    }

    /// Processes a buy spending a share of the quote balance. The fee is
    /// taken out of the amount spent.
    fn process_buy(&mut self, order: &OrderRequest, price: Decimal) -> OrderOutcome {
        let spend = share_of(self.quote, order.percentage);
        if let Some(reason) = self.check_size(spend, &self.settings.quote_asset) {
            return Self::declined(reason);
        }

        let fee = spend * self.settings.taker_fee;
        let quantity = (spend - fee) / price;
        self.quote -= spend;
        self.base += quantity;

        self.fill(order, price, quantity, spend, fee)
    }

    /// Processes a sell of a share of the base balance. The fee is taken out
    /// of the proceeds.
    fn process_sell(&mut self, order: &OrderRequest, price: Decimal) -> OrderOutcome {
        let quantity = share_of(self.base, order.percentage);
        if quantity.is_zero() {
            return Self::declined(DeclineReason::InsufficientBalance {
                asset: self.settings.base_asset.clone(),
            });
        }
        let notional = quantity * price;
        if let Some(reason) = self.check_size(notional, &self.settings.base_asset) {
            return Self::declined(reason);
        }

        let fee = notional * self.settings.taker_fee;
        self.base -= quantity;
        self.quote += notional - fee;

        self.fill(order, price, quantity, notional, fee)
    }

    fn fill(
        &mut self,
        order: &OrderRequest,
        price: Decimal,
        quantity: Decimal,
        quote_quantity: Decimal,
        fee: Decimal,
    ) -> OrderOutcome {
        let order_id = self.next_order_id;
        self.next_order_id += 1;

        OrderOutcome::Filled(Fill {
            symbol: order.symbol.clone(),
            side: order.side,
            order_id: Some(order_id),
            price,
            quantity,
            quote_quantity,
            fee,
        })
    }
}

#[async_trait]
impl Executor for SimulatedExecutor {
    fn name(&self) -> &'static str {
        "SimulatedExecutor"
    }

    async fn balances(&self) -> Result<Balances> {
        Ok(Balances {
            base_asset: self.settings.base_asset.clone(),
            base: self.base,
            quote_asset: self.settings.quote_asset.clone(),
            quote: self.quote,
        })
    }

    async fn execute(&mut self, order_request: &OrderRequest, current_price: Decimal) -> OrderOutcome {
        if current_price <= Decimal::ZERO {
            return OrderOutcome::TransientFailure {
                reason: format!("no usable reference price ({current_price})"),
            };
        }

        let outcome = match order_request.side {
            Side::Buy => self.process_buy(order_request, current_price),
            Side::Sell => self.process_sell(order_request, current_price),
        };
        if outcome.is_filled() {
            tracing::info!(
                side = %order_request.side,
                price = %current_price,
                base = %self.base,
                quote = %self.quote,
                "Simulated order filled."
            );
        }
        outcome
    }

    async fn reconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Symbol;
    use rust_decimal_macros::dec;

    fn settings() -> SimulationSettings {
        SimulationSettings {
            base_asset: "ETH".into(),
            quote_asset: "BUSD".into(),
            base_balance: Decimal::ZERO,
            quote_balance: dec!(1000),
            taker_fee: dec!(0.001),
            min_notional: dec!(10),
        }
    }

    fn order(side: Side, percentage: Decimal) -> OrderRequest {
        OrderRequest {
            symbol: Symbol("ETHBUSD".into()),
            side,
            percentage,
        }
    }

    #[tokio::test]
    async fn buy_then_sell_round_trip() {
        let mut executor = SimulatedExecutor::new(settings()).unwrap();

        let outcome = executor.execute(&order(Side::Buy, dec!(70)), dec!(100)).await;
        let fill = match outcome {
            OrderOutcome::Filled(fill) => fill,
            other => panic!("expected a fill, got {other:?}"),
        };
        assert_eq!(fill.quote_quantity, dec!(700));
        assert_eq!(fill.fee, dec!(0.7));
        assert_eq!(fill.quantity, dec!(6.993));

        let balances = executor.balances().await.unwrap();
        assert_eq!(balances.quote, dec!(300));
        assert_eq!(balances.base, dec!(6.993));

        let outcome = executor.execute(&order(Side::Sell, dec!(100)), dec!(110)).await;
        assert!(outcome.is_filled());
        let balances = executor.balances().await.unwrap();
        assert_eq!(balances.base, Decimal::ZERO);
        assert_eq!(balances.quote, dec!(300) + dec!(769.23) - dec!(0.76923));
    }

    #[tokio::test]
    async fn sell_without_base_is_declined() {
        let mut executor = SimulatedExecutor::new(settings()).unwrap();
        let outcome = executor.execute(&order(Side::Sell, dec!(50)), dec!(100)).await;
        assert_eq!(
            outcome,
            OrderOutcome::Declined {
                reason: DeclineReason::InsufficientBalance { asset: "ETH".into() }
            }
        );
    }

    #[tokio::test]
    async fn small_orders_fall_below_min_notional() {
        let mut settings = settings();
        settings.quote_balance = dec!(20);
        let mut executor = SimulatedExecutor::new(settings).unwrap();

        let outcome = executor.execute(&order(Side::Buy, dec!(30)), dec!(100)).await;
        assert_eq!(
            outcome,
            OrderOutcome::Declined {
                reason: DeclineReason::BelowMinNotional {
                    notional: dec!(6),
                    minimum: dec!(10)
                }
            }
        );
        assert_eq!(executor.balances().await.unwrap().quote, dec!(20));
    }

    #[tokio::test]
    async fn zero_price_is_transient() {
        let mut executor = SimulatedExecutor::new(settings()).unwrap();
        let outcome = executor.execute(&order(Side::Buy, dec!(100)), Decimal::ZERO).await;
        assert!(matches!(outcome, OrderOutcome::TransientFailure { .. }));
    }

    #[tokio::test]
    async fn order_ids_increase() {
        let mut executor = SimulatedExecutor::new(settings()).unwrap();
        let first = executor.execute(&order(Side::Buy, dec!(30)), dec!(100)).await;
        let second = executor.execute(&order(Side::Buy, dec!(30)), dec!(100)).await;
        match (first, second) {
            (OrderOutcome::Filled(a), OrderOutcome::Filled(b)) => {
                assert_eq!(a.order_id, Some(1));
                assert_eq!(b.order_id, Some(2));
            }
            other => panic!("expected two fills, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_fee() {
        let mut settings = settings();
        settings.taker_fee = dec!(1.5);
        assert!(SimulatedExecutor::new(settings).is_err());
    }
}
