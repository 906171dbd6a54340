//! Configuration for the daily scheduler

use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When and how the daily action runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Name used in logs and fault reports
    #[serde(default = "default_name")]
    pub name: String,

    /// Hour of the daily fire (0-23, local time)
    #[serde(default)]
    pub run_at_hour: u32,

    /// Minute of the daily fire (0-59)
    #[serde(default)]
    pub run_at_minute: u32,

    /// Seconds added after the time of day, so the action lands safely past
    /// a date rollover
    #[serde(default = "default_offset_secs")]
    pub offset_secs: u64,

    /// Fire once right after start instead of waiting for the first due time
    #[serde(default = "default_run_immediately")]
    pub run_immediately: bool,
}

fn default_name() -> String {
    "cleanup".to_string()
}

fn default_offset_secs() -> u64 {
    10
}

fn default_run_immediately() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            run_at_hour: 0,
            run_at_minute: 0,
            offset_secs: default_offset_secs(),
            run_immediately: default_run_immediately(),
        }
    }
}

impl SchedulerConfig {
    /// Daily fire at `hour:minute` with the default offset
    pub fn at(hour: u32, minute: u32) -> Self {
        Self {
            run_at_hour: hour,
            run_at_minute: minute,
            ..Default::default()
        }
    }

    /// Time of day as a duration since midnight
    pub fn time_of_day(&self) -> Result<Duration> {
        if self.run_at_hour > 23 {
            return Err(SchedulerError::Config(format!(
                "run_at_hour must be 0-23, got {}",
                self.run_at_hour
            )));
        }
        if self.run_at_minute > 59 {
            return Err(SchedulerError::Config(format!(
                "run_at_minute must be 0-59, got {}",
                self.run_at_minute
            )));
        }
        Ok(Duration::from_secs(
            u64::from(self.run_at_hour) * 3600 + u64::from(self.run_at_minute) * 60,
        ))
    }

    /// Offset as a duration
    pub fn offset(&self) -> Duration {
        Duration::from_secs(self.offset_secs)
    }
}
