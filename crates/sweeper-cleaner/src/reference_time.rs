//! Reference time sources - the "now" that ages are measured against

use crate::error::{CleanerError, Result};
use chrono::{Local, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;

/// Supplies the instant used to compute a policy's border.
///
/// The one-argument form must be pure: it normalizes an already captured
/// instant and never reads the clock. The zero-argument form is the only one
/// allowed to read the system clock, and policies call it once per evaluation.
pub trait ReferenceTime: Send + Sync + fmt::Debug {
    /// Normalize `now` into a reference instant
    fn reference_time_at(&self, now: NaiveDateTime) -> NaiveDateTime;

    /// Reference instant for the current local wall-clock time
    fn reference_time(&self) -> NaiveDateTime {
        self.reference_time_at(Local::now().naive_local())
    }
}

/// Live current time
#[derive(Debug, Clone, Copy, Default)]
pub struct NowReference;

impl ReferenceTime for NowReference {
    fn reference_time_at(&self, now: NaiveDateTime) -> NaiveDateTime {
        now
    }
}

/// Today at 00:00
///
/// Makes every evaluation during one calendar day agree on the same border, so
/// a sweep at 00:00:10 and one at 23:59 delete the same set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodayMidnight;

impl ReferenceTime for TodayMidnight {
    fn reference_time_at(&self, now: NaiveDateTime) -> NaiveDateTime {
        NaiveDateTime::new(now.date(), NaiveTime::MIN)
    }
}

/// Today at a fixed whole hour
#[derive(Debug, Clone, Copy)]
pub struct TodayFixedHour {
    at: NaiveTime,
}

impl TodayFixedHour {
    /// Create a source pinned to `hour` (0-23) of the current day
    pub fn new(hour: u32) -> Result<Self> {
        let at = NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| CleanerError::Config(format!("hour must be in 0..24, got {}", hour)))?;
        Ok(Self { at })
    }

    /// The configured hour
    pub fn hour(&self) -> u32 {
        self.at.hour()
    }
}

impl ReferenceTime for TodayFixedHour {
    fn reference_time_at(&self, now: NaiveDateTime) -> NaiveDateTime {
        NaiveDateTime::new(now.date(), self.at)
    }
}

/// A constant instant, for replaying a sweep as of a known moment
#[derive(Debug, Clone, Copy)]
pub struct FixedReference(pub NaiveDateTime);

impl ReferenceTime for FixedReference {
    fn reference_time_at(&self, _now: NaiveDateTime) -> NaiveDateTime {
        self.0
    }

    fn reference_time(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_now_is_identity() {
        let now = at(2024, 1, 10, 13, 45);
        assert_eq!(NowReference.reference_time_at(now), now);
    }

    #[test]
    fn test_midnight_truncates_to_date() {
        let now = at(2024, 1, 10, 13, 45);
        assert_eq!(TodayMidnight.reference_time_at(now), at(2024, 1, 10, 0, 0));
    }

    #[test]
    fn test_fixed_hour() {
        let source = TodayFixedHour::new(6).unwrap();
        assert_eq!(source.hour(), 6);
        assert_eq!(source.reference_time_at(at(2024, 1, 10, 1, 30)), at(2024, 1, 10, 6, 0));
        assert_eq!(source.reference_time_at(at(2024, 1, 10, 23, 0)), at(2024, 1, 10, 6, 0));
    }

    #[test]
    fn test_fixed_hour_rejects_out_of_range() {
        assert!(matches!(TodayFixedHour::new(24), Err(CleanerError::Config(_))));
    }

    #[test]
    fn test_fixed_reference_ignores_clock() {
        let fixed = FixedReference(at(2024, 1, 10, 0, 0));
        assert_eq!(fixed.reference_time(), at(2024, 1, 10, 0, 0));
        assert_eq!(fixed.reference_time_at(at(2030, 5, 5, 5, 5)), at(2024, 1, 10, 0, 0));
    }

    #[test]
    fn test_single_argument_form_is_deterministic() {
        let now = at(2024, 2, 29, 18, 0);
        assert_eq!(TodayMidnight.reference_time_at(now), TodayMidnight.reference_time_at(now));
    }
}
