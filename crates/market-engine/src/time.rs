//! Wall-clock helper.

use market_types::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since UNIX epoch.
#[must_use]
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}
