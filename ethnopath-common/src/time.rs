//! Clock and budget conversions
//!
//! Budgets are configured in whole milliseconds (TOML, environment, CLI)
//! and enforced as `Duration`s.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Wall-clock time stamped on runs and results
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn millis_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Whole milliseconds of a budget, saturating at `u64::MAX`
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
