// In crates/execution/src/lib.rs

use async_trait::async_trait;
use core_types::{Balances, OrderOutcome, OrderRequest};
use rust_decimal::Decimal;

pub mod error;
pub mod live;
pub mod simulated;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use live::LiveExecutor;
pub use simulated::SimulatedExecutor;
pub use types::{FeeTopUp, SimulationSettings};

/// The universal interface for an execution handler.
///
/// An `Executor` is bound to one trading pair. It turns a percentage-sized
/// `OrderRequest` into a market order against a live exchange or an
/// in-memory simulation, and reports what happened as an `OrderOutcome`.
#[async_trait]
pub trait Executor: Send {
    /// The name of the executor (e.g., "LiveExecutor", "SimulatedExecutor").
    fn name(&self) -> &'static str;

    /// Free balances of the pair's base and quote assets.
    async fn balances(&self) -> Result<Balances>;

    /// Executes a given order request.
    ///
    /// Refusals (balance, minimum size, exchange rejection) come back as
    /// `OrderOutcome::Declined`, network trouble as `TransientFailure`.
    ///
    /// # Arguments
    ///
    /// * `order_request`: The side and balance percentage to trade.
    /// * `current_price`: The latest close, used by executors that have no
    ///   market of their own.
    async fn execute(&mut self, order_request: &OrderRequest, current_price: Decimal) -> OrderOutcome;

    /// Re-establishes the connection to the exchange.
    async fn reconnect(&mut self) -> Result<()>;
}

/// `balance * percentage / 100`.
pub(crate) fn share_of(balance: Decimal, percentage: Decimal) -> Decimal {
    balance * percentage / Decimal::ONE_HUNDRED
}
