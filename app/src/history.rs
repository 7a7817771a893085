// In app/src/history.rs

use chrono::NaiveDate;
use core_types::Kline;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Pause between history pages, to stay clear of the exchange's rate limits.
const PAGE_DELAY: Duration = Duration::from_millis(500);

/// Pages through `[start, end]` with `fetch_page(from)` until a short page or
/// a page reaching `end` comes back.
pub async fn fetch_klines<F, Fut>(
    mut fetch_page: F,
    start: i64,
    end: i64,
    page_limit: u16,
) -> anyhow::Result<Vec<Kline>>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<Kline>>>,
{
    let mut klines: Vec<Kline> = Vec::new();
    let mut current_start = start;

    loop {
        tracing::debug!(from = current_start, "Fetching batch of klines...");
        let batch = fetch_page(current_start).await?;
        let Some(last) = batch.last() else {
            break;
        };

        let next_start = last.open_time + 1;
        let full_page = batch.len() >= usize::from(page_limit);
        tracing::info!(count = batch.len(), to = last.open_time, "Received klines.");
        klines.extend(batch.into_iter().filter(|k| k.open_time <= end));

        if !full_page || next_start > end {
            break;
        }
        current_start = next_start;
        sleep(PAGE_DELAY).await;
    }

    Ok(klines)
}

/// Length of a Binance kline interval in milliseconds. Monthly klines have no
/// fixed length and return `None`.
pub fn interval_millis(interval: &str) -> Option<i64> {
    let unit_at = interval.len().checked_sub(1)?;
    if !interval.is_char_boundary(unit_at) {
        return None;
    }
    let (amount, unit) = interval.split_at(unit_at);
    let amount: i64 = amount.parse().ok().filter(|a| *a > 0)?;
    let unit_ms = match unit {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 604_800_000,
        _ => return None,
    };
    amount.checked_mul(unit_ms)
}

/// `YYYY-MM-DD` to the first millisecond of that UTC day.
pub fn day_start_millis(date: &str) -> anyhow::Result<i64> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Failed to parse date {date:?}: {e}"))?;
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| anyhow::anyhow!("Invalid date {date:?}"))
}

/// `YYYY-MM-DD` to the last millisecond of that UTC day.
pub fn day_end_millis(date: &str) -> anyhow::Result<i64> {
    Ok(day_start_millis(date)? + 86_400_000 - 1)
}
