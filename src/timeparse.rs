use chrono::{Local, NaiveDateTime};

use crate::error::{AppError, Result};

const COMBINED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a stored timestamp, tolerating the serialization drift the sample
/// log has accumulated over its lifetime: `T` or space as date/time
/// separator, with or without fractional seconds. Falls back to dropping the
/// fraction entirely before giving up, so older entries stay readable.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, COMBINED_FORMAT) {
        return Ok(dt);
    }

    let unified = raw.replacen(' ', "T", 1);
    if let Ok(dt) = NaiveDateTime::parse_from_str(&unified, COMBINED_FORMAT) {
        return Ok(dt);
    }

    let base = unified.split('.').next().unwrap_or(&unified);
    NaiveDateTime::parse_from_str(base, SECONDS_FORMAT)
        .map_err(|_| AppError::MalformedTimestamp(raw.to_string()))
}

/// Current instant in local wall-clock time, matching the persisted format.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Encoding used when persisting new samples (microsecond precision).
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Local calendar-day key (`YYYY-MM-DD`) used by every grouping site.
pub fn date_key(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d").to_string()
}
