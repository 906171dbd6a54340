//! Error types for cleanup operations

use std::io;
use std::path::PathBuf;
use sweeper_domain::EntryKind;
use thiserror::Error;

/// Result type alias for cleaner construction
pub type Result<T> = std::result::Result<T, CleanerError>;

/// Errors that can occur while building a cleaner
///
/// Sweeps themselves never fail; per-item problems are reported as
/// [`ItemDeletionError`] through a [`crate::DeletionListener`].
#[derive(Error, Debug)]
pub enum CleanerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Step at which a single item failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    /// Reading metadata or listing the entry
    Inspect,

    /// Removing the entry
    Delete,
}

impl ItemStage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStage::Inspect => "inspect",
            ItemStage::Delete => "delete",
        }
    }
}

/// A single file or folder that could not be inspected or removed
///
/// Always isolated: the sweep that produced it carries on with the next item.
#[derive(Error, Debug)]
#[error("failed to {} {} {}: {source}", .stage.as_str(), .kind.as_str(), .path.display())]
pub struct ItemDeletionError {
    /// Path of the offending entry
    pub path: PathBuf,

    /// File or folder
    pub kind: EntryKind,

    /// Whether inspection or removal failed
    pub stage: ItemStage,

    /// Underlying I/O error (in use, permission denied, already gone, ...)
    #[source]
    pub source: io::Error,
}

impl ItemDeletionError {
    /// Create a new item error
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind, stage: ItemStage, source: io::Error) -> Self {
        Self {
            path: path.into(),
            kind,
            stage,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_error_display() {
        let err = ItemDeletionError::new(
            "/var/log/app/old.log",
            EntryKind::File,
            ItemStage::Delete,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to delete file /var/log/app/old.log: denied");
    }
}
