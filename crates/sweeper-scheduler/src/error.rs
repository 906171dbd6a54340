//! Error types for scheduler operations

use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors returned to the caller of the scheduler
///
/// Only construction problems and caller misuse surface here. Failures of the
/// scheduled action itself are reported as [`ActionFault`] and never returned.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Invalid time of day or offset
    #[error("Configuration error: {0}")]
    Config(String),

    /// `start` called while a timer is armed or an action is running
    #[error("Scheduler already started")]
    AlreadyStarted,

    /// The running action did not finish within the stop timeout
    #[error("Timed out after {0:?} waiting for the running action to finish")]
    Timeout(Duration),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

/// A scheduled action that returned an error or panicked
///
/// Isolated to one fire: the scheduler logs it, hands it to the fault
/// listener and re-arms for the next day.
#[derive(Error, Debug)]
#[error("scheduled action of '{scheduler}' failed on {fired_on}: {error:#}")]
pub struct ActionFault {
    /// Name of the scheduler instance that ran the action
    pub scheduler: String,

    /// Calendar date of the failed fire
    pub fired_on: NaiveDate,

    /// The action panicked instead of returning an error
    pub panicked: bool,

    /// What the action reported (or the panic message)
    pub error: anyhow::Error,
}
