//! Thin adapters over the `ta` crate that return bar-aligned series.
//!
//! `ta` emits a value from the very first input; these wrappers blank out the
//! bars an indicator cannot compute yet, so callers see `None` during warm-up.

use crate::{Error, Result};
use core_types::Kline;
use num_traits::cast::ToPrimitive;
use ta::Next;
use ta::indicators::{
    MovingAverageConvergenceDivergence as Macd, RelativeStrengthIndex as Rsi,
    SimpleMovingAverage as Sma,
};

/// One reading per kline; `None` where the indicator is undefined.
pub type IndicatorSeries = Vec<Option<f64>>;

/// The three aligned lines of a MACD.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Close prices as `f64`, in kline order.
pub fn closes(klines: &[Kline]) -> Vec<f64> {
    klines
        .iter()
        .map(|k| k.close.to_f64().unwrap_or(f64::NAN))
        .collect()
}

/// Feeds `closes` through `indicator`, masking the first `warmup` readings.
pub fn series<I>(mut indicator: I, closes: &[f64], warmup: usize) -> IndicatorSeries
where
    I: Next<f64, Output = f64>,
{
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let value = indicator.next(*close);
            (i >= warmup && value.is_finite()).then_some(value)
        })
        .collect()
}

/// Same as [`series`] for a MACD; the signal line needs `signal_period - 1`
/// more bars than the MACD line.
pub fn macd_series(mut indicator: Macd, closes: &[f64], slow: usize, signal: usize) -> MacdSeries {
    let line_warmup = slow.saturating_sub(1);
    let signal_warmup = line_warmup + signal.saturating_sub(1);

    let mut out = MacdSeries {
        macd: Vec::with_capacity(closes.len()),
        signal: Vec::with_capacity(closes.len()),
        histogram: Vec::with_capacity(closes.len()),
    };
    for (i, close) in closes.iter().enumerate() {
        let value = indicator.next(*close);
        out.macd
            .push((i >= line_warmup && value.macd.is_finite()).then_some(value.macd));
        out.signal
            .push((i >= signal_warmup && value.signal.is_finite()).then_some(value.signal));
        out.histogram.push(
            (i >= signal_warmup && value.histogram.is_finite()).then_some(value.histogram),
        );
    }
    out
}

pub fn sma_indicator(period: u32) -> Result<Sma> {
    Sma::new(period as usize).map_err(|_| Error::InvalidPeriod {
        indicator: "SMA",
        period,
    })
}

pub fn rsi_indicator(period: u32) -> Result<Rsi> {
    Rsi::new(period as usize).map_err(|_| Error::InvalidPeriod {
        indicator: "RSI",
        period,
    })
}

pub fn macd_indicator(fast: u32, slow: u32, signal: u32) -> Result<Macd> {
    if fast >= slow {
        return Err(Error::InvalidSettings {
            indicator: "MACD",
            reason: format!("fast period ({fast}) must be shorter than slow period ({slow})"),
        });
    }
    Macd::new(fast as usize, slow as usize, signal as usize).map_err(|_| Error::InvalidPeriod {
        indicator: "MACD",
        period: fast.min(slow).min(signal),
    })
}
