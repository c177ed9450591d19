//! Wall-clock timestamps.
//!
//! Every timestamp in the model is a UTC instant serialized as epoch
//! milliseconds, the resolution the session documents are stored at.

use chrono::{DateTime, TimeZone, Utc};

/// UTC instant with millisecond resolution on the wire.
pub type Timestamp = DateTime<Utc>;

/// Current time truncated to whole milliseconds, so a value survives a
/// serialization round trip unchanged.
pub fn now() -> Timestamp {
    from_millis(Utc::now().timestamp_millis())
}

/// Build a timestamp from epoch milliseconds. Out-of-range values clamp to
/// the epoch.
pub fn from_millis(ms: i64) -> Timestamp {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_default()
}
