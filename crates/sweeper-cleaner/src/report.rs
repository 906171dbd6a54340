//! Metrics collected during a cleanup pass

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of one or more cleanup passes
///
/// Tracks what was deleted, what was eligible and what failed. Reports for
/// several roots can be merged with [`CleanupReport::absorb`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Roots covered by this report
    pub roots: Vec<PathBuf>,

    /// Directories visited below the roots
    pub directories_scanned: usize,

    /// Files the file policy accepted
    pub files_eligible: usize,

    /// Folders the folder policy accepted
    pub folders_eligible: usize,

    /// Files actually removed
    pub files_deleted: usize,

    /// Folders actually removed
    pub folders_deleted: usize,

    /// Files that could not be inspected or removed
    pub file_failures: usize,

    /// Folders that could not be inspected or removed
    pub folder_failures: usize,

    /// Paths behind the failures, in the order they happened
    pub failed_paths: Vec<PathBuf>,

    /// The pass stopped early on a cancellation request
    pub cancelled: bool,

    /// Eligible items were only counted, not deleted
    pub dry_run: bool,

    /// Wall time spent, in milliseconds
    pub elapsed_ms: u64,
}

impl CleanupReport {
    /// Create an empty report for one root
    pub fn for_root(root: &Path) -> Self {
        Self {
            roots: vec![root.to_path_buf()],
            ..Default::default()
        }
    }

    /// Record a file failure
    pub fn record_file_failure(&mut self, path: &Path) {
        self.file_failures += 1;
        self.failed_paths.push(path.to_path_buf());
    }

    /// Record a folder failure
    pub fn record_folder_failure(&mut self, path: &Path) {
        self.folder_failures += 1;
        self.failed_paths.push(path.to_path_buf());
    }

    /// Total items removed
    pub fn total_deleted(&self) -> usize {
        self.files_deleted + self.folders_deleted
    }

    /// Total items that failed
    pub fn total_failures(&self) -> usize {
        self.file_failures + self.folder_failures
    }

    /// Merge another pass into this one
    pub fn absorb(&mut self, other: CleanupReport) {
        self.roots.extend(other.roots);
        self.directories_scanned += other.directories_scanned;
        self.files_eligible += other.files_eligible;
        self.folders_eligible += other.folders_eligible;
        self.files_deleted += other.files_deleted;
        self.folders_deleted += other.folders_deleted;
        self.file_failures += other.file_failures;
        self.folder_failures += other.folder_failures;
        self.failed_paths.extend(other.failed_paths);
        self.cancelled |= other.cancelled;
        self.dry_run |= other.dry_run;
        self.elapsed_ms += other.elapsed_ms;
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Cleanup Summary".to_string(),
            format!("  Roots: {}", self.roots.len()),
            format!("  Directories scanned: {}", self.directories_scanned),
        ];

        if self.dry_run {
            lines.push(format!(
                "  Would delete: {} file(s), {} folder(s)",
                self.files_eligible, self.folders_eligible
            ));
        } else {
            lines.push(format!(
                "  Deleted: {} file(s), {} folder(s)",
                self.files_deleted, self.folders_deleted
            ));
        }

        if self.total_failures() > 0 {
            lines.push(format!(
                "  Failed: {} file(s), {} folder(s)",
                self.file_failures, self.folder_failures
            ));
        }
        if self.cancelled {
            lines.push("  Stopped early: cancellation requested".to_string());
        }
        lines.push(format!("  Elapsed: {}ms", self.elapsed_ms));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_merges_counts() {
        let mut a = CleanupReport::for_root(Path::new("/logs/a"));
        a.files_deleted = 3;
        a.record_file_failure(Path::new("/logs/a/locked.log"));

        let mut b = CleanupReport::for_root(Path::new("/logs/b"));
        b.folders_deleted = 2;
        b.cancelled = true;

        a.absorb(b);

        assert_eq!(a.roots.len(), 2);
        assert_eq!(a.total_deleted(), 5);
        assert_eq!(a.total_failures(), 1);
        assert!(a.cancelled);
    }

    #[test]
    fn test_summary_mentions_failures_only_when_present() {
        let mut report = CleanupReport::for_root(Path::new("/logs"));
        assert!(!report.summary().contains("Failed"));

        report.record_folder_failure(Path::new("/logs/busy"));
        assert!(report.summary().contains("Failed: 0 file(s), 1 folder(s)"));
    }

    #[test]
    fn test_summary_dry_run_wording() {
        let report = CleanupReport {
            dry_run: true,
            files_eligible: 4,
            ..Default::default()
        };
        assert!(report.summary().contains("Would delete: 4 file(s)"));
    }
}
