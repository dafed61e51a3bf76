//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for storage
///
/// Fixed-width RFC 3339 with nanoseconds, so lexical order in SQLite matches
/// chronological order.
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored timestamp
pub fn from_storage(value: &str) -> crate::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| crate::Error::Internal(format!("Invalid stored timestamp {:?}: {}", value, e)))
}

/// Short month/day label for list views, e.g. "Oct 16"
pub fn short_date(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d").to_string()
}
