//! Wall-clock source for due-time and same-day computations

use chrono::{Local, NaiveDateTime, TimeDelta};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Supplies the local wall-clock time the scheduler plans against
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;
}

/// The system's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use sweeper_scheduler::{Clock, ManualClock};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance(TimeDelta::days(1));
/// assert_eq!(clock.now().date(), NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Create a clock stopped at `now`
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Jump to `now`
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
