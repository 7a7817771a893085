// In crates/app-config/src/runtime.rs

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How long the live loop keeps trading, parsed from strings like `30s`, `15m`, `4h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runtime(Duration);

impl Runtime {
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for Runtime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRuntime(s.to_string());
        let trimmed = s.trim();
        let unit_at = trimmed.len().checked_sub(1).ok_or_else(invalid)?;
        if !trimmed.is_char_boundary(unit_at) {
            return Err(invalid());
        }
        let (amount, unit) = trimmed.split_at(unit_at);
        if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let amount: u64 = amount.parse().map_err(|_| invalid())?;

        let seconds = match unit {
            "s" => Some(amount),
            "m" => amount.checked_mul(60),
            "h" => amount.checked_mul(3600),
            _ => None,
        }
        .ok_or_else(invalid)?;

        Ok(Runtime(Duration::from_secs(seconds)))
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        if secs != 0 && secs % 3600 == 0 {
            write!(f, "{}h", secs / 3600)
        } else if secs != 0 && secs % 60 == 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{}s", secs)
        }
    }
}
