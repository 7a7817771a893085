// In crates/risk/src/controller.rs

use crate::SizingPolicy;
use core_types::{Position, Side, SignalEvent};
use rust_decimal::Decimal;

/// An accepted action: what to do, how much of the balance to commit, and the
/// signal bar it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Side,
    /// Percentage in (0, 100].
    pub percentage: Decimal,
    pub price: Decimal,
    pub timestamp: i64,
}

impl Decision {
    /// The position after this decision has been carried out.
    pub fn apply(&self, position: Position) -> Position {
        position.advance(self.action, self.price)
    }
}

/// The BUY -> SELL -> BUY alternation rule shared by the backtest and the
/// live loop. Only the sizing policy differs between them.
///
/// The controller holds no position of its own; callers pass the current
/// `Position` in and apply the returned `Decision` once it has been executed.
#[derive(Debug, Clone)]
pub struct PositionController<P> {
    policy: P,
}

impl<P: SizingPolicy> PositionController<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Decides whether `signal` should be acted on from `position`.
    ///
    /// Returns `None` (hold) when there is no signal, when the signal is not
    /// the action the phase expects, or when the policy declines to size it.
    pub fn decide(
        &self,
        position: &Position,
        signal: Option<&SignalEvent>,
        sizing_value: Option<f64>,
    ) -> Option<Decision> {
        let signal = signal?;
        let desired = position.expected_action();
        if signal.action != desired {
            tracing::trace!(
                desired = %desired,
                signal = %signal.action,
                "Signal does not match the expected action; holding."
            );
            return None;
        }

        let Some(percentage) = self.policy.size(desired, sizing_value) else {
            tracing::debug!(
                policy = self.policy.name(),
                action = %desired,
                sizing_value = ?sizing_value,
                "Sizing value outside every tier; holding."
            );
            return None;
        };

        Some(Decision {
            action: desired,
            percentage,
            price: signal.price,
            timestamp: signal.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TieredSizingSettings;
    use crate::{FullBalance, TieredSizing};
    use core_types::Phase;
    use rust_decimal_macros::dec;

    fn signal(action: Side, price: Decimal) -> SignalEvent {
        SignalEvent {
            timestamp: 60_000,
            indicator_value: 1.0,
            action,
            price,
        }
    }

    fn tiered() -> PositionController<TieredSizing> {
        PositionController::new(TieredSizing::new(TieredSizingSettings::default()).unwrap())
    }

    #[test]
    fn acts_only_on_the_expected_action() {
        let controller = PositionController::new(FullBalance);
        let flat = Position::default();

        assert_eq!(controller.decide(&flat, Some(&signal(Side::Sell, dec!(9))), None), None);

        let decision = controller
            .decide(&flat, Some(&signal(Side::Buy, dec!(8))), None)
            .unwrap();
        assert_eq!(decision.action, Side::Buy);
        assert_eq!(decision.percentage, dec!(100));
        assert_eq!(decision.price, dec!(8));

        let held = decision.apply(flat);
        assert_eq!(held.phase, Phase::AwaitingExit);
        assert_eq!(held.entry_price, Some(dec!(8)));
        assert_eq!(controller.decide(&held, Some(&signal(Side::Buy, dec!(7))), None), None);
    }

    #[test]
    fn missing_signal_is_a_hold() {
        let controller = tiered();
        assert_eq!(controller.decide(&Position::default(), None, Some(10.0)), None);
    }

    #[test]
    fn tiered_sizing_selects_percentage() {
        let controller = tiered();
        let flat = Position::default();
        let buy = signal(Side::Buy, dec!(100));

        assert_eq!(
            controller.decide(&flat, Some(&buy), Some(25.0)).map(|d| d.percentage),
            Some(dec!(70))
        );
        assert_eq!(
            controller.decide(&flat, Some(&buy), Some(45.0)).map(|d| d.percentage),
            Some(dec!(30))
        );
        assert_eq!(controller.decide(&flat, Some(&buy), Some(60.0)), None);
        assert_eq!(controller.decide(&flat, Some(&buy), None), None);
    }

    #[test]
    fn initial_sell_phase_sells_first() {
        let controller = tiered();
        let held = Position::new(Phase::awaiting(Side::Sell));

        let decision = controller
            .decide(&held, Some(&signal(Side::Sell, dec!(20))), Some(75.0))
            .unwrap();
        assert_eq!(decision.percentage, dec!(100));
        assert_eq!(decision.apply(held).phase, Phase::AwaitingEntry);
    }

    #[test]
    fn hold_leaves_position_untouched() {
        let controller = tiered();
        let flat = Position::default();
        let decision = controller.decide(&flat, Some(&signal(Side::Buy, dec!(1))), Some(55.0));
        assert!(decision.is_none());
        assert_eq!(flat.phase, Phase::AwaitingEntry);
    }
}
