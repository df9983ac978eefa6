//! Time source port.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Cache freshness checks and `lastUpdated` stamps go through this trait so
/// expiry can be exercised without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
