// In crates/backtester/src/report.rs

use crate::BacktestReport;
use chrono::DateTime;
use std::fmt::Write;

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Renders the report the `backtest` command prints.
pub fn render_report(report: &BacktestReport) -> String {
    let mut out = String::new();
    let perf = &report.performance;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "\n--- Backtest Report ---");
    for entry in &report.ledger {
        let _ = writeln!(
            out,
            "{}  {:<4} @ {}",
            format_timestamp(entry.timestamp),
            entry.side,
            entry.price
        );
    }
    let _ = writeln!(out, "-----------------------");
    let _ = writeln!(out, "Initial Balance:  {:.2}", report.initial_balance);
    let _ = writeln!(out, "Final Balance:    {:.2}", report.final_balance);
    let _ = writeln!(out, "Change:           {:.2}%", perf.change_percentage);
    match perf.win_rate() {
        Ok(rate) => {
            let _ = writeln!(
                out,
                "Success Rate:     {:.2}% ({}/{} trades)",
                rate * 100.0,
                perf.wins,
                perf.total_trades
            );
        }
        Err(err) => {
            let _ = writeln!(out, "Success Rate:     {err}");
        }
    }
    let _ = writeln!(out, "-----------------------");
    out
}

/// Helper function to print the backtest report in a readable format.
pub fn print_report(report: &BacktestReport) {
    print!("{}", render_report(report));
}
