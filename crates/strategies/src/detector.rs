// In crates/strategies/src/detector.rs

use core_types::{Kline, Side, SignalEvent};

/// Upper and lower levels of a bounded oscillator (e.g. 70 / 30 on RSI).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivots {
    pub upper: f64,
    pub lower: f64,
}

/// Selects a detection family and carries its input series.
///
/// Every series must be aligned index-for-index with the klines handed to
/// [`detect`]; extra entries on either side are ignored.
#[derive(Debug, Clone, Copy)]
pub enum Detection<'a> {
    /// Edge-triggered: one event each time `fast` moves above or back below `slow`.
    Crossover {
        fast: &'a [Option<f64>],
        slow: &'a [Option<f64>],
    },
    /// Level-triggered: SELL above `pivots.upper`, BUY below `pivots.lower`,
    /// on every bar the condition holds.
    Threshold {
        oscillator: &'a [Option<f64>],
        pivots: Pivots,
    },
}

/// Turns indicator readings into signal events, in kline order.
///
/// Bars where a required reading is undefined never emit and never change the
/// crossover state. The function is pure: equal inputs give equal outputs.
pub fn detect(klines: &[Kline], detection: Detection<'_>) -> Vec<SignalEvent> {
    match detection {
        Detection::Crossover { fast, slow } => detect_crossovers(klines, fast, slow),
        Detection::Threshold { oscillator, pivots } => {
            detect_thresholds(klines, oscillator, pivots)
        }
    }
}

fn detect_crossovers(klines: &[Kline], fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<SignalEvent> {
    let mut events = Vec::new();
    let mut fast_above_slow = false;

    for ((kline, fast), slow) in klines.iter().zip(fast).zip(slow) {
        let (Some(fast), Some(slow)) = (defined(*fast), defined(*slow)) else {
            continue;
        };

        if fast > slow && !fast_above_slow {
            fast_above_slow = true;
            events.push(event(kline, fast, Side::Buy));
        } else if fast <= slow && fast_above_slow {
            fast_above_slow = false;
            events.push(event(kline, fast, Side::Sell));
        }
    }

    events
}

fn detect_thresholds(klines: &[Kline], oscillator: &[Option<f64>], pivots: Pivots) -> Vec<SignalEvent> {
    klines
        .iter()
        .zip(oscillator)
        .filter_map(|(kline, value)| {
            let value = defined(*value)?;
            if value > pivots.upper {
                Some(event(kline, value, Side::Sell))
            } else if value < pivots.lower {
                Some(event(kline, value, Side::Buy))
            } else {
                None
            }
        })
        .collect()
}

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn event(kline: &Kline, indicator_value: f64, action: Side) -> SignalEvent {
    SignalEvent {
        timestamp: kline.open_time,
        indicator_value,
        action,
        price: kline.close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::klines_from_closes;
    use rust_decimal_macros::dec;

    const CLOSES: [f64; 10] = [10.0, 10.0, 10.0, 8.0, 9.0, 11.0, 12.0, 9.0, 8.0, 7.0];

    fn actions(events: &[SignalEvent]) -> Vec<(i64, Side)> {
        events.iter().map(|e| (e.timestamp / 60_000, e.action)).collect()
    }

    #[test]
    fn crossover_fires_once_per_crossing() {
        let klines = klines_from_closes(&CLOSES);
        let fast = [None, None, Some(1.0), Some(2.0), Some(2.0), Some(2.5), Some(2.0), Some(1.0), Some(1.0), Some(1.2)];
        let slow = [None, Some(1.5), Some(1.5), Some(1.5), Some(1.5), Some(1.5), Some(1.5), Some(1.5), Some(1.5), Some(1.5)];

        let events = detect(&klines, Detection::Crossover { fast: &fast, slow: &slow });

        assert_eq!(actions(&events), vec![(3, Side::Buy), (7, Side::Sell)]);
        assert_eq!(events[0].price, dec!(8));
        assert_eq!(events[1].price, dec!(9));
        assert_eq!(events[0].indicator_value, 2.0);
    }

    #[test]
    fn crossover_starts_below_so_initial_equality_is_silent() {
        let klines = klines_from_closes(&[1.0, 1.0, 1.0]);
        let fast = [Some(1.0), Some(1.0), Some(0.5)];
        let slow = [Some(1.0), Some(1.0), Some(1.0)];
        assert!(detect(&klines, Detection::Crossover { fast: &fast, slow: &slow }).is_empty());
    }

    #[test]
    fn crossover_gap_does_not_reset_state() {
        let klines = klines_from_closes(&[1.0; 5]);
        let fast = [Some(2.0), None, Some(3.0), Some(f64::NAN), Some(0.5)];
        let slow = [Some(1.0), Some(1.0), None, Some(1.0), Some(1.0)];

        let events = detect(&klines, Detection::Crossover { fast: &fast, slow: &slow });

        // Bars 1-3 are gaps; the BUY state from bar 0 survives them.
        assert_eq!(actions(&events), vec![(0, Side::Buy), (4, Side::Sell)]);
    }

    #[test]
    fn threshold_is_level_triggered() {
        let klines = klines_from_closes(&[1.0; 5]);
        let oscillator = [Some(75.0), Some(80.0), Some(65.0), Some(25.0), Some(50.0)];
        let pivots = Pivots { upper: 70.0, lower: 30.0 };

        let events = detect(&klines, Detection::Threshold { oscillator: &oscillator, pivots });

        assert_eq!(
            actions(&events),
            vec![(0, Side::Sell), (1, Side::Sell), (3, Side::Buy)]
        );
        assert_eq!(events[2].indicator_value, 25.0);
    }

    #[test]
    fn threshold_sustained_overbought_emits_every_bar() {
        let klines = klines_from_closes(&[1.0; 6]);
        let oscillator = [None, Some(71.0), Some(90.0), Some(88.0), Some(75.0), Some(70.5)];
        let pivots = Pivots { upper: 70.0, lower: 30.0 };

        let events = detect(&klines, Detection::Threshold { oscillator: &oscillator, pivots });

        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.action == Side::Sell));
    }

    #[test]
    fn threshold_pivots_are_exclusive() {
        let klines = klines_from_closes(&[1.0; 2]);
        let oscillator = [Some(70.0), Some(30.0)];
        let pivots = Pivots { upper: 70.0, lower: 30.0 };
        assert!(detect(&klines, Detection::Threshold { oscillator: &oscillator, pivots }).is_empty());
    }

    #[test]
    fn all_undefined_series_yields_nothing() {
        let klines = klines_from_closes(&[1.0; 4]);
        let undefined = [None; 4];
        assert!(detect(&klines, Detection::Crossover { fast: &undefined, slow: &undefined }).is_empty());
        let pivots = Pivots { upper: 70.0, lower: 30.0 };
        assert!(detect(&klines, Detection::Threshold { oscillator: &undefined, pivots }).is_empty());
    }

    #[test]
    fn detection_is_idempotent() {
        let klines = klines_from_closes(&CLOSES);
        let fast: Vec<Option<f64>> = CLOSES.iter().map(|c| Some(*c)).collect();
        let slow: Vec<Option<f64>> = std::iter::once(None)
            .chain(CLOSES.windows(2).map(|w| Some((w[0] + w[1]) / 2.0)))
            .collect();
        let detection = Detection::Crossover { fast: &fast, slow: &slow };

        assert_eq!(detect(&klines, detection), detect(&klines, detection));
    }
}
