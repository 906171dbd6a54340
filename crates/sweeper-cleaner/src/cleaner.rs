//! Cleanup engine - walks a root and applies the delete policies

use crate::error::{ItemDeletionError, ItemStage};
use crate::listener::{DeletionListener, TracingListener};
use crate::policy::DeletePolicy;
use crate::report::CleanupReport;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use sweeper_domain::{Cancellable, CancellationToken, EntryKind};
use walkdir::WalkDir;

/// Removes stale content below a root directory
///
/// Implementations never fail as a whole: a missing root is a no-op and every
/// per-item problem is reported, not returned.
pub trait Cleaner: Send + Sync {
    /// Clean `root`, stopping early if `cancel` is triggered
    fn cleanup_with_cancel(&self, root: &Path, cancel: &CancellationToken) -> CleanupReport;

    /// Clean `root` to completion
    fn cleanup(&self, root: &Path) -> CleanupReport {
        self.cleanup_with_cancel(root, &CancellationToken::new())
    }
}

/// Cleaner that does nothing (deletion disabled)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCleaner;

impl Cleaner for NoOpCleaner {
    fn cleanup_with_cancel(&self, root: &Path, _cancel: &CancellationToken) -> CleanupReport {
        CleanupReport::for_root(root)
    }
}

/// Filesystem cleanup engine
///
/// Visits every directory below the root, deepest first, deletes the files the
/// file policy accepts, then asks the folder policy about the directory itself.
/// Because a directory is judged after its own files and after its
/// subdirectories, a folder emptied during a pass can be removed in that same
/// pass.
///
/// The engine is synchronous, single-threaded and holds no mutable state, so
/// one instance may serve several roots. Concurrent calls on the same root are
/// not coordinated.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use sweeper_cleaner::{Cleaner, CleanerBuilder, LogCleanerBuilder};
/// use sweeper_domain::RetentionWindow;
///
/// let cleaner = LogCleanerBuilder.build(RetentionWindow::from_days(30));
/// let report = cleaner.cleanup(Path::new("/var/log/myapp"));
/// println!("{}", report.summary());
/// ```
#[derive(Clone)]
pub struct FileSystemCleaner {
    file_policy: DeletePolicy,
    folder_policy: DeletePolicy,
    listener: Arc<dyn DeletionListener>,
    dry_run: bool,
}

impl std::fmt::Debug for FileSystemCleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemCleaner")
            .field("file_policy", &self.file_policy)
            .field("folder_policy", &self.folder_policy)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl FileSystemCleaner {
    /// Create a cleaner from a file and a folder policy
    pub fn new(file_policy: DeletePolicy, folder_policy: DeletePolicy) -> Self {
        Self {
            file_policy,
            folder_policy,
            listener: Arc::new(TracingListener),
            dry_run: false,
        }
    }

    /// Route item failures to `listener` instead of the log
    pub fn with_listener(mut self, listener: Arc<dyn DeletionListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Only count eligible items, never delete
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Policy applied to files
    pub fn file_policy(&self) -> &DeletePolicy {
        &self.file_policy
    }

    /// Policy applied to folders
    pub fn folder_policy(&self) -> &DeletePolicy {
        &self.folder_policy
    }

    /// Whether this cleaner runs in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Every directory strictly below `root`, longest path first.
    ///
    /// Path length stands in for depth: a descendant's path is always longer
    /// than its ancestor's, so children are visited before their parents.
    /// Unrelated branches may interleave, which does not matter because each
    /// folder decision only depends on its own subtree.
    fn collect_directories(&self, root: &Path, report: &mut CleanupReport) -> Vec<PathBuf> {
        let mut directories = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => directories.push(entry.into_path()),
                Ok(_) => {}
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                    self.folder_failed(report, ItemDeletionError::new(path, EntryKind::Folder, ItemStage::Inspect, source));
                }
            }
        }

        directories.sort_by(|a, b| b.as_os_str().len().cmp(&a.as_os_str().len()));
        directories
    }

    /// Delete the stale files directly inside `dir` (non-recursive)
    fn sweep_files(&self, dir: &Path, report: &mut CleanupReport) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                self.folder_failed(report, ItemDeletionError::new(dir, EntryKind::Folder, ItemStage::Inspect, err));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.file_failed(report, ItemDeletionError::new(dir, EntryKind::File, ItemStage::Inspect, err));
                    continue;
                }
            };

            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let path = entry.path();
            match self.file_policy.should_delete_file(&path) {
                Ok(false) => {}
                Ok(true) => {
                    report.files_eligible += 1;
                    if self.dry_run {
                        tracing::debug!(path = %path.display(), "DRY RUN: would delete file");
                        continue;
                    }
                    match fs::remove_file(&path) {
                        Ok(()) => {
                            report.files_deleted += 1;
                            tracing::debug!(path = %path.display(), "deleted file");
                        }
                        Err(err) => {
                            self.file_failed(report, ItemDeletionError::new(path, EntryKind::File, ItemStage::Delete, err));
                        }
                    }
                }
                Err(err) => {
                    self.file_failed(report, ItemDeletionError::new(path, EntryKind::File, ItemStage::Inspect, err));
                }
            }
        }
    }

    /// Remove `dir` itself if the folder policy accepts it (never recursive)
    fn sweep_folder(&self, dir: &Path, report: &mut CleanupReport) {
        match self.folder_policy.should_delete_folder(dir) {
            Ok(false) => {}
            Ok(true) => {
                report.folders_eligible += 1;
                if self.dry_run {
                    tracing::debug!(path = %dir.display(), "DRY RUN: would delete folder");
                    return;
                }
                match fs::remove_dir(dir) {
                    Ok(()) => {
                        report.folders_deleted += 1;
                        tracing::debug!(path = %dir.display(), "deleted folder");
                    }
                    Err(err) => {
                        self.folder_failed(report, ItemDeletionError::new(dir, EntryKind::Folder, ItemStage::Delete, err));
                    }
                }
            }
            Err(err) => {
                self.folder_failed(report, ItemDeletionError::new(dir, EntryKind::Folder, ItemStage::Inspect, err));
            }
        }
    }

    fn file_failed(&self, report: &mut CleanupReport, error: ItemDeletionError) {
        report.record_file_failure(&error.path);
        self.listener.on_file_error(&error);
    }

    fn folder_failed(&self, report: &mut CleanupReport, error: ItemDeletionError) {
        report.record_folder_failure(&error.path);
        self.listener.on_folder_error(&error);
    }
}

impl Cleaner for FileSystemCleaner {
    fn cleanup_with_cancel(&self, root: &Path, cancel: &CancellationToken) -> CleanupReport {
        let mut report = CleanupReport::for_root(root);
        report.dry_run = self.dry_run;

        if root.as_os_str().is_empty() || !root.is_dir() {
            tracing::debug!(root = %root.display(), "cleanup root missing, nothing to do");
            return report;
        }

        let start = Instant::now();
        let directories = self.collect_directories(root, &mut report);

        for dir in &directories {
            if cancel.is_cancelled() {
                report.cancelled = true;
                tracing::info!(root = %root.display(), "cleanup cancelled");
                break;
            }

            report.directories_scanned += 1;
            self.sweep_files(dir, &mut report);
            self.sweep_folder(dir, &mut report);
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            root = %root.display(),
            directories = report.directories_scanned,
            files_deleted = report.files_deleted,
            folders_deleted = report.folders_deleted,
            failures = report.total_failures(),
            dry_run = self.dry_run,
            "cleanup pass finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_time::{FixedReference, ReferenceTime};
    use chrono::{Local, NaiveDateTime, TimeDelta};
    use sweeper_domain::{RetentionWindow, TimestampSource};

    fn future_cleaner(dry_run: bool) -> FileSystemCleaner {
        let reference = Arc::new(FixedReference(Local::now().naive_local() + TimeDelta::days(30)));
        let retention = RetentionWindow::from_days(1);
        FileSystemCleaner::new(
            DeletePolicy::file(TimestampSource::LastWrite, retention, reference.clone()),
            DeletePolicy::folder(TimestampSource::LastWrite, true, retention, reference),
        )
        .with_dry_run(dry_run)
    }

    #[test]
    fn test_directories_sorted_deepest_first() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("a/bb/ccc")).unwrap();
        fs::create_dir_all(root.path().join("d")).unwrap();

        let cleaner = future_cleaner(true);
        let mut report = CleanupReport::default();
        let dirs = cleaner.collect_directories(root.path(), &mut report);

        assert_eq!(dirs.len(), 4);
        assert!(dirs[0].ends_with("a/bb/ccc"));
        assert!(!dirs.iter().any(|d| d == root.path()));
        let lengths: Vec<usize> = dirs.iter().map(|d| d.as_os_str().len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let day = root.path().join("2024-01-01");
        fs::create_dir(&day).unwrap();
        fs::write(day.join("app.log"), b"x").unwrap();

        let report = future_cleaner(true).cleanup(root.path());

        assert!(report.dry_run);
        assert_eq!(report.files_eligible, 1);
        assert_eq!(report.total_deleted(), 0);
        assert!(day.join("app.log").exists());
    }

    #[test]
    fn test_noop_cleaner_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("old")).unwrap();

        let report = NoOpCleaner.cleanup(root.path());

        assert_eq!(report.total_deleted(), 0);
        assert!(root.path().join("old").exists());
    }

    #[test]
    fn test_cancelled_before_start_visits_nothing() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("old")).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = future_cleaner(false).cleanup_with_cancel(root.path(), &cancel);

        assert!(report.cancelled);
        assert_eq!(report.directories_scanned, 0);
        assert!(root.path().join("old").exists());
    }

    /// Fixed instant that trips the token the first time a policy reads it
    #[derive(Debug)]
    struct CancelOnFirstRead {
        at: NaiveDateTime,
        cancel: CancellationToken,
    }

    impl ReferenceTime for CancelOnFirstRead {
        fn reference_time_at(&self, _now: NaiveDateTime) -> NaiveDateTime {
            self.at
        }

        fn reference_time(&self) -> NaiveDateTime {
            self.cancel.cancel();
            self.at
        }
    }

    #[test]
    fn test_cancelled_mid_sweep_stops_after_current_directory() {
        let root = tempfile::tempdir().unwrap();
        let deep = root.path().join("a/deep");
        let sibling = root.path().join("b");
        fs::create_dir_all(&deep).unwrap();
        fs::create_dir(&sibling).unwrap();
        fs::write(deep.join("stale.log"), b"x").unwrap();
        fs::write(sibling.join("stale.log"), b"x").unwrap();

        let cancel = CancellationToken::new();
        let future = Local::now().naive_local() + TimeDelta::days(30);
        let retention = RetentionWindow::from_days(1);
        let cleaner = FileSystemCleaner::new(
            DeletePolicy::file(
                TimestampSource::LastWrite,
                retention,
                Arc::new(CancelOnFirstRead { at: future, cancel: cancel.clone() }),
            ),
            DeletePolicy::folder(TimestampSource::LastWrite, true, retention, Arc::new(FixedReference(future))),
        );

        let report = cleaner.cleanup_with_cancel(root.path(), &cancel);

        assert!(report.cancelled);
        assert_eq!(report.directories_scanned, 1);
        assert!(!deep.join("stale.log").exists());
        assert!(sibling.join("stale.log").exists());
        assert!(root.path().join("a").exists());
    }
}
