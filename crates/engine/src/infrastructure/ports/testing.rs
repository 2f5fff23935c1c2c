//! Testability port for injecting time.

use chrono::{DateTime, Utc};

/// Tests use `FixedClock`, which can be advanced between ticks.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
