//! Delete policies - deciding whether a single file or folder is stale

use crate::reference_time::ReferenceTime;
use chrono::{DateTime, Local, NaiveDateTime, TimeDelta};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use sweeper_domain::{EntryKind, FilesystemEntry, RetentionWindow, TimestampSource};

/// Age-based deletion rule for one kind of entry
///
/// A policy is one strategy parameterized by the target kind, the timestamp
/// it reads and, for folders, whether the folder must be empty. It is
/// immutable and can be shared across sweeps without locking.
///
/// An entry is eligible when its selected timestamp is strictly earlier than
/// the border `reference - retention`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sweeper_cleaner::{DeletePolicy, TodayMidnight};
/// use sweeper_domain::{RetentionWindow, TimestampSource};
///
/// let files = DeletePolicy::file(
///     TimestampSource::LastWrite,
///     RetentionWindow::from_days(30),
///     Arc::new(TodayMidnight),
/// );
/// assert!(files.retention().is_enabled());
/// ```
#[derive(Debug, Clone)]
pub struct DeletePolicy {
    target: EntryKind,
    source: TimestampSource,
    require_empty: bool,
    retention: RetentionWindow,
    reference: Arc<dyn ReferenceTime>,
}

impl DeletePolicy {
    /// Policy for files
    pub fn file(
        source: TimestampSource,
        retention: RetentionWindow,
        reference: Arc<dyn ReferenceTime>,
    ) -> Self {
        Self {
            target: EntryKind::File,
            source,
            require_empty: false,
            retention,
            reference,
        }
    }

    /// Policy for folders, optionally refusing any folder that still has children
    pub fn folder(
        source: TimestampSource,
        require_empty: bool,
        retention: RetentionWindow,
        reference: Arc<dyn ReferenceTime>,
    ) -> Self {
        Self {
            target: EntryKind::Folder,
            source,
            require_empty,
            retention,
            reference,
        }
    }

    /// Kind of entry this policy judges
    pub fn target(&self) -> EntryKind {
        self.target
    }

    /// Timestamp the policy reads
    pub fn source(&self) -> TimestampSource {
        self.source
    }

    /// Whether folders must be empty to be eligible
    pub fn require_empty(&self) -> bool {
        self.require_empty
    }

    /// Configured retention window
    pub fn retention(&self) -> RetentionWindow {
        self.retention
    }

    /// Age cutoff for a given reference instant, `None` when deletion is disabled
    pub fn border(&self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        let retention = self.retention.duration()?;
        // A window longer than chrono can represent reaches before any timestamp.
        let border = TimeDelta::from_std(retention)
            .ok()
            .and_then(|delta| reference.checked_sub_signed(delta))
            .unwrap_or(NaiveDateTime::MIN);
        Some(border)
    }

    /// Pure eligibility decision for an already probed entry
    pub fn is_eligible(&self, entry: &FilesystemEntry, reference: NaiveDateTime) -> bool {
        let Some(border) = self.border(reference) else {
            return false;
        };

        if self.target == EntryKind::Folder && self.require_empty && entry.has_children {
            return false;
        }

        match entry.timestamp(self.source) {
            Some(timestamp) => to_local(timestamp) < border,
            None => false,
        }
    }

    /// Whether the file at `path` should be deleted now
    ///
    /// Returns `Ok(false)` without touching the filesystem when the retention
    /// window is disabled. Must be called on a file policy.
    pub fn should_delete_file(&self, path: &Path) -> io::Result<bool> {
        debug_assert_eq!(self.target, EntryKind::File, "folder policy asked about a file");
        self.evaluate(path)
    }

    /// Whether the folder at `path` should be deleted now
    ///
    /// For require-empty policies a folder with any child entry is rejected
    /// before its age is looked at. Must be called on a folder policy.
    pub fn should_delete_folder(&self, path: &Path) -> io::Result<bool> {
        debug_assert_eq!(self.target, EntryKind::Folder, "file policy asked about a folder");
        self.evaluate(path)
    }

    fn evaluate(&self, path: &Path) -> io::Result<bool> {
        if !self.retention.is_enabled() {
            return Ok(false);
        }

        let entry = FilesystemEntry::probe(path)?;
        if self.target == EntryKind::Folder && self.require_empty && entry.has_children {
            return Ok(false);
        }

        if entry.timestamp(self.source).is_none() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{} time is not recorded for this entry", self.source.as_str()),
            ));
        }

        Ok(self.is_eligible(&entry, self.reference.reference_time()))
    }
}

/// Convert a filesystem timestamp to local wall-clock time
pub(crate) fn to_local(timestamp: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(timestamp).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_time::{FixedReference, TodayMidnight};
    use chrono::{NaiveDate, TimeZone};
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn system(t: NaiveDateTime) -> SystemTime {
        Local.from_local_datetime(&t).earliest().unwrap().into()
    }

    fn entry(kind: EntryKind, created: NaiveDateTime, modified: NaiveDateTime, has_children: bool) -> FilesystemEntry {
        FilesystemEntry {
            path: PathBuf::from("/logs/entry"),
            kind,
            created: Some(system(created)),
            modified: Some(system(modified)),
            has_children,
        }
    }

    fn fixed(t: NaiveDateTime) -> Arc<dyn ReferenceTime> {
        Arc::new(FixedReference(t))
    }

    #[test]
    fn test_disabled_window_never_deletes() {
        let reference = at(2024, 1, 10, 0);
        let ancient = at(1990, 1, 1, 0);

        let file = DeletePolicy::file(TimestampSource::Creation, RetentionWindow::disabled(), fixed(reference));
        let folder = DeletePolicy::folder(TimestampSource::LastWrite, false, RetentionWindow::disabled(), fixed(reference));

        assert_eq!(file.border(reference), None);
        assert!(!file.is_eligible(&entry(EntryKind::File, ancient, ancient, false), reference));
        assert!(!folder.is_eligible(&entry(EntryKind::Folder, ancient, ancient, false), reference));
    }

    #[test]
    fn test_disabled_window_skips_io() {
        let policy = DeletePolicy::file(TimestampSource::Creation, RetentionWindow::disabled(), Arc::new(TodayMidnight));
        // Path does not exist; a disabled policy must not even look.
        assert!(!policy.should_delete_file(Path::new("/definitely/not/here")).unwrap());
    }

    #[test]
    fn test_border_is_strict() {
        let reference = at(2024, 1, 10, 0);
        let policy = DeletePolicy::file(TimestampSource::Creation, RetentionWindow::from_hours(24), fixed(reference));
        let border = policy.border(reference).unwrap();
        assert_eq!(border, at(2024, 1, 9, 0));

        let exactly = entry(EntryKind::File, border, border, false);
        assert!(!policy.is_eligible(&exactly, reference));

        let just_before = border - TimeDelta::seconds(1);
        let older = entry(EntryKind::File, just_before, just_before, false);
        assert!(policy.is_eligible(&older, reference));
    }

    #[test]
    fn test_concrete_scenario() {
        let reference = at(2024, 1, 10, 0);
        let retention = RetentionWindow::from_hours(24);

        let file_policy = DeletePolicy::file(TimestampSource::Creation, retention, fixed(reference));
        let file = entry(EntryKind::File, at(2024, 1, 8, 23), at(2024, 1, 9, 12), false);
        assert!(file_policy.is_eligible(&file, reference));

        let folder_policy = DeletePolicy::folder(TimestampSource::LastWrite, true, retention, fixed(reference));
        let empty = entry(EntryKind::Folder, at(2024, 1, 1, 0), at(2024, 1, 1, 0), false);
        assert!(folder_policy.is_eligible(&empty, reference));

        let occupied = entry(EntryKind::Folder, at(2024, 1, 1, 0), at(2024, 1, 1, 0), true);
        assert!(!folder_policy.is_eligible(&occupied, reference));
    }

    #[test]
    fn test_timestamp_source_selection() {
        let reference = at(2024, 1, 10, 0);
        let retention = RetentionWindow::from_hours(24);
        // Created long ago, touched yesterday evening.
        let touched = entry(EntryKind::File, at(2023, 6, 1, 0), at(2024, 1, 9, 20), false);

        let by_creation = DeletePolicy::file(TimestampSource::Creation, retention, fixed(reference));
        let by_write = DeletePolicy::file(TimestampSource::LastWrite, retention, fixed(reference));

        assert!(by_creation.is_eligible(&touched, reference));
        assert!(!by_write.is_eligible(&touched, reference));
    }

    #[test]
    fn test_non_empty_folder_allowed_without_require_empty() {
        let reference = at(2024, 1, 10, 0);
        let policy = DeletePolicy::folder(TimestampSource::Creation, false, RetentionWindow::from_hours(1), fixed(reference));
        let occupied = entry(EntryKind::Folder, at(2020, 1, 1, 0), at(2020, 1, 1, 0), true);
        assert!(policy.is_eligible(&occupied, reference));
    }

    #[test]
    fn test_missing_timestamp_is_not_eligible() {
        let reference = at(2024, 1, 10, 0);
        let policy = DeletePolicy::file(TimestampSource::Creation, RetentionWindow::from_hours(1), fixed(reference));
        let mut unknown = entry(EntryKind::File, at(2020, 1, 1, 0), at(2020, 1, 1, 0), false);
        unknown.created = None;
        assert!(!policy.is_eligible(&unknown, reference));
    }

    #[test]
    fn test_huge_window_never_deletes() {
        let reference = at(2024, 1, 10, 0);
        let policy = DeletePolicy::file(
            TimestampSource::LastWrite,
            RetentionWindow::of(Duration::from_secs(u64::MAX)),
            fixed(reference),
        );
        let old = entry(EntryKind::File, at(1971, 1, 1, 0), at(1971, 1, 1, 0), false);
        assert!(!policy.is_eligible(&old, reference));
    }

    #[test]
    fn test_should_delete_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.log");
        fs::write(&file, b"line").unwrap();
        let folder = dir.path().join("2024-01-01");
        fs::create_dir(&folder).unwrap();

        let future = Local::now().naive_local() + TimeDelta::days(30);
        let retention = RetentionWindow::from_days(1);
        let files = DeletePolicy::file(TimestampSource::LastWrite, retention, fixed(future));
        let folders = DeletePolicy::folder(TimestampSource::LastWrite, true, retention, fixed(future));

        assert!(files.should_delete_file(&file).unwrap());
        assert!(folders.should_delete_folder(&folder).unwrap());

        fs::write(folder.join("keep.log"), b"").unwrap();
        assert!(!folders.should_delete_folder(&folder).unwrap());
    }

    #[test]
    fn test_should_delete_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let policy = DeletePolicy::file(TimestampSource::LastWrite, RetentionWindow::from_days(1), Arc::new(TodayMidnight));
        assert!(policy.should_delete_file(&dir.path().join("gone.log")).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "folder policy asked about a file")]
    fn test_folder_policy_rejects_file_question() {
        let dir = tempfile::tempdir().unwrap();
        let policy = DeletePolicy::folder(TimestampSource::Creation, true, RetentionWindow::from_days(1), Arc::new(TodayMidnight));
        let _ = policy.should_delete_file(dir.path());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "file policy asked about a folder")]
    fn test_file_policy_rejects_folder_question() {
        let dir = tempfile::tempdir().unwrap();
        let policy = DeletePolicy::file(TimestampSource::LastWrite, RetentionWindow::from_days(1), Arc::new(TodayMidnight));
        let _ = policy.should_delete_folder(dir.path());
    }
}
