#![forbid(unsafe_code)]

use inv_core::expiration::format_date;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

const EPOCH_RFC3339: &str = "1970-01-01T00:00:00Z";

/// Audit timestamps are stored as unix milliseconds.
pub(crate) fn ts_ms_to_rfc3339(ts_ms: i64) -> String {
    let nanos = i128::from(ts_ms) * 1_000_000;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| EPOCH_RFC3339.to_string())
}

/// `YYYY-MM-DD`, or `null` for an item that does not expire.
pub(crate) fn date_value(date: Option<Date>) -> Value {
    match date {
        Some(date) => Value::String(format_date(date)),
        None => Value::Null,
    }
}
