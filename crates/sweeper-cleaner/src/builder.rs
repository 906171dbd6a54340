//! Ready-made cleaner presets

use crate::cleaner::{Cleaner, FileSystemCleaner};
use crate::policy::DeletePolicy;
use crate::reference_time::{NowReference, ReferenceTime, TodayMidnight};
use std::sync::Arc;
use sweeper_domain::{RetentionWindow, TimestampSource};

/// Builds a cleaner for a given retention window
pub trait CleanerBuilder {
    /// Build a cleaner; a disabled window yields a cleaner that deletes nothing
    fn build(&self, retention: RetentionWindow) -> Arc<dyn Cleaner>;
}

/// General purpose preset
///
/// - Reference: live current time
/// - Files and folders: creation time, folders need not be empty
///
/// Non-empty folders that pass the age check are still attempted; the
/// non-recursive removal fails and is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCleanerBuilder;

impl DefaultCleanerBuilder {
    /// Build the concrete engine
    pub fn build_engine(&self, retention: RetentionWindow) -> FileSystemCleaner {
        let reference: Arc<dyn ReferenceTime> = Arc::new(NowReference);
        FileSystemCleaner::new(
            DeletePolicy::file(TimestampSource::Creation, retention, reference.clone()),
            DeletePolicy::folder(TimestampSource::Creation, false, retention, reference),
        )
    }
}

impl CleanerBuilder for DefaultCleanerBuilder {
    fn build(&self, retention: RetentionWindow) -> Arc<dyn Cleaner> {
        Arc::new(self.build_engine(retention))
    }
}

/// Preset for rotating log trees
///
/// - Reference: today at midnight, so every sweep on the same day agrees
/// - Files: last write time. A log reopened while investigating an incident
///   is kept for a full window after that write. Creation time would also
///   misjudge files rotated weekly or monthly.
/// - Folders: creation time and must be empty. Last write time would let a
///   stray touch keep an otherwise dead folder alive.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCleanerBuilder;

impl LogCleanerBuilder {
    /// Build the concrete engine
    pub fn build_engine(&self, retention: RetentionWindow) -> FileSystemCleaner {
        let reference: Arc<dyn ReferenceTime> = Arc::new(TodayMidnight);
        FileSystemCleaner::new(
            DeletePolicy::file(TimestampSource::LastWrite, retention, reference.clone()),
            DeletePolicy::folder(TimestampSource::Creation, true, retention, reference),
        )
    }
}

impl CleanerBuilder for LogCleanerBuilder {
    fn build(&self, retention: RetentionWindow) -> Arc<dyn Cleaner> {
        Arc::new(self.build_engine(retention))
    }
}
