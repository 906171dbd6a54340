//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cleaner setup error
    #[error("Cleaner error: {0}")]
    Cleaner(#[from] sweeper_cleaner::CleanerError),

    /// Scheduler error
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] sweeper_scheduler::SchedulerError),

    /// Service error
    #[error("Service error: {0}")]
    Service(#[from] sweeper_service::ServiceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Background task failed
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}
