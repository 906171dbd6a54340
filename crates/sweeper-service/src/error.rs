//! Error types for the retention service

use sweeper_scheduler::SchedulerError;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur when driving the retention service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service was shut down
    #[error("Retention service has been shut down")]
    Disposed,

    /// Scheduler error
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}
