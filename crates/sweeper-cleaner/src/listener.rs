//! Error channel for per-item deletion failures

use crate::error::ItemDeletionError;

/// Receives every file or folder the engine failed to inspect or remove.
///
/// Called synchronously from the sweeping thread. Implementations must not
/// panic; the sweep continues with the next item after each call.
pub trait DeletionListener: Send + Sync {
    /// A file could not be inspected or deleted
    fn on_file_error(&self, error: &ItemDeletionError);

    /// A folder could not be inspected or deleted
    fn on_folder_error(&self, error: &ItemDeletionError);
}

/// Default listener: logs each failure at `warn`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl DeletionListener for TracingListener {
    fn on_file_error(&self, error: &ItemDeletionError) {
        tracing::warn!(
            path = %error.path.display(),
            stage = error.stage.as_str(),
            error = %error.source,
            "file cleanup failed"
        );
    }

    fn on_folder_error(&self, error: &ItemDeletionError) {
        tracing::warn!(
            path = %error.path.display(),
            stage = error.stage.as_str(),
            error = %error.source,
            "folder cleanup failed"
        );
    }
}

impl<F> DeletionListener for F
where
    F: Fn(&ItemDeletionError) + Send + Sync,
{
    fn on_file_error(&self, error: &ItemDeletionError) {
        self(error)
    }

    fn on_folder_error(&self, error: &ItemDeletionError) {
        self(error)
    }
}
