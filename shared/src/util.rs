//! Time helpers shared by client and server

use chrono::{NaiveDate, Utc};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Local calendar day formatted as `YYYY-MM-DD`
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
