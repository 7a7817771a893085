//! Property tests for the signal detector.
//!
//! 1. Crossover output strictly alternates, starting with BUY
//! 2. Threshold output matches a per-bar classification of the oscillator
//! 3. Detection is deterministic

use core_types::{Kline, Side};
use proptest::prelude::*;
use rust_decimal::Decimal;
use strategies::{Detection, Pivots, detect};

fn klines(len: usize) -> Vec<Kline> {
    (0..len)
        .map(|i| Kline {
            open_time: i as i64 * 60_000,
            open: Decimal::ONE,
            high: Decimal::ONE,
            low: Decimal::ONE,
            close: Decimal::from(i as i64 + 1),
            volume: Decimal::ONE,
            close_time: i as i64 * 60_000 + 59_999,
        })
        .collect()
}

fn arb_reading() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        6 => (0.0..100.0_f64).prop_map(Some),
    ]
}

fn arb_pair_series() -> impl Strategy<Value = (Vec<Option<f64>>, Vec<Option<f64>>)> {
    (0usize..80).prop_flat_map(|len| {
        (
            prop::collection::vec(arb_reading(), len),
            prop::collection::vec(arb_reading(), len),
        )
    })
}

proptest! {
    #[test]
    fn crossover_events_alternate((fast, slow) in arb_pair_series()) {
        let klines = klines(fast.len());
        let events = detect(&klines, Detection::Crossover { fast: &fast, slow: &slow });

        if let Some(first) = events.first() {
            prop_assert_eq!(first.action, Side::Buy);
        }
        for pair in events.windows(2) {
            prop_assert_ne!(pair[0].action, pair[1].action);
            prop_assert!(pair[0].timestamp < pair[1].timestamp);
        }

        let buys = events.iter().filter(|e| e.action == Side::Buy).count();
        let sells = events.len() - buys;
        prop_assert!(buys == sells || buys == sells + 1);
    }

    #[test]
    fn threshold_classifies_every_defined_bar(
        oscillator in prop::collection::vec(arb_reading(), 0..80),
    ) {
        let klines = klines(oscillator.len());
        let pivots = Pivots { upper: 70.0, lower: 30.0 };
        let events = detect(&klines, Detection::Threshold { oscillator: &oscillator, pivots });

        let expected: Vec<(i64, Side)> = oscillator
            .iter()
            .enumerate()
            .filter_map(|(i, v)| match v {
                Some(v) if *v > 70.0 => Some((i as i64 * 60_000, Side::Sell)),
                Some(v) if *v < 30.0 => Some((i as i64 * 60_000, Side::Buy)),
                _ => None,
            })
            .collect();
        let actual: Vec<(i64, Side)> = events.iter().map(|e| (e.timestamp, e.action)).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn detection_is_deterministic((fast, slow) in arb_pair_series()) {
        let klines = klines(fast.len());
        let detection = Detection::Crossover { fast: &fast, slow: &slow };
        prop_assert_eq!(detect(&klines, detection), detect(&klines, detection));
    }
}
