//! Wall clock abstraction
//!
//! Daily counters and history filters work on the local calendar day. The
//! clock is injected so tests can pin both the instant and the UTC offset.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar day of an instant
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// System time in the machine's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// Settable clock with a fixed UTC offset
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    /// Clock at `now` in UTC
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}
