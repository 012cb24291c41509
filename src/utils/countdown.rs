//! Countdown formatting for the PIX payment window.

use chrono::{DateTime, Utc};

/// Seconds left until `expires_at`, clamped at zero.
pub fn seconds_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expires_at - now).num_seconds().max(0)
}

/// Formats the time left until `expires_at` as zero-padded `MM:SS`.
/// Past deadlines render as "00:00".
pub fn format_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = seconds_remaining(expires_at, now);
    format!("{:02}:{:02}", remaining / 60, remaining % 60)
}
