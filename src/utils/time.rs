//! Duration units, countdown formatting and clock drift.
//!
//! All timestamps here are Unix epoch milliseconds.

use chrono::{DateTime, Duration, Utc};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Unit conversions into milliseconds. Fractional input is allowed.
pub struct Ms;

impl Ms {
    pub fn s(seconds: f64) -> i64 {
        (seconds * MS_PER_SECOND as f64).round() as i64
    }

    pub fn m(minutes: f64) -> i64 {
        (minutes * MS_PER_MINUTE as f64).round() as i64
    }
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Renders `mm:ss`, or `hh:mm:ss` from one hour up. Sub-second remainders are
/// dropped and negative input reads as zero.
pub fn format(ms: i64) -> String {
    let ms = ms.max(0);
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Negative durations count as zero elapsed.
pub fn end_at_from(start_ms: i64, duration_ms: i64) -> i64 {
    start_ms.saturating_add(duration_ms.max(0))
}

pub fn end_at(start: DateTime<Utc>, duration_ms: i64) -> DateTime<Utc> {
    start + Duration::milliseconds(duration_ms.max(0))
}

/// Seconds left of `budget_seconds` for a countdown running since `since`.
/// Never negative; a `since` in the future counts as no time elapsed.
pub fn remaining_seconds(budget_seconds: i32, since: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let elapsed = (now - since).num_seconds().max(0);
    (i64::from(budget_seconds) - elapsed).clamp(0, i64::from(i32::MAX)) as i32
}

/// `local - authoritative`; positive when the local clock runs ahead.
pub fn drift_ms(authoritative_ms: i64, local_ms: i64) -> i64 {
    local_ms.saturating_sub(authoritative_ms)
}
