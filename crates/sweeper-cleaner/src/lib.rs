//! Sweeper Cleaner
//!
//! Retention-policy cleanup engine for directory trees such as rotating logs.
//!
//! # Overview
//!
//! The cleaner is responsible for:
//! - **Reference time**: deciding which "now" ages are measured against
//! - **Delete policies**: judging a single file or folder against a retention
//!   window, by creation or last write time
//! - **Traversal**: walking a root deepest-first so folders emptied during a
//!   pass are removed in the same pass
//! - **Fault isolation**: reporting every failed item without aborting the sweep
//!
//! ## Eligibility
//!
//! | Policy | Reads | Eligible when |
//! |--------|-------|---------------|
//! | File | creation or last write | `timestamp < reference - retention` |
//! | Folder | creation or last write | same, and empty if required |
//! | Any, retention disabled | nothing | never |
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```no_run
//! use std::path::Path;
//! use sweeper_cleaner::{Cleaner, CleanerConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cleaner = CleanerConfig::default().build()?;
//! let report = cleaner.cleanup(Path::new("/var/log/myapp"));
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Policies
//!
//! ```
//! use std::sync::Arc;
//! use sweeper_cleaner::{DeletePolicy, FileSystemCleaner, NowReference};
//! use sweeper_domain::{RetentionWindow, TimestampSource};
//!
//! let reference = Arc::new(NowReference);
//! let retention = RetentionWindow::from_hours(12);
//! let cleaner = FileSystemCleaner::new(
//!     DeletePolicy::file(TimestampSource::Creation, retention, reference.clone()),
//!     DeletePolicy::folder(TimestampSource::LastWrite, true, retention, reference),
//! );
//! assert!(!cleaner.is_dry_run());
//! ```
//!
//! # Configuration
//!
//! The cleaner can be configured via TOML:
//!
//! ```toml
//! [cleaner]
//! retention_hours = 720
//! reference = "midnight"
//! file_timestamp = "last_write"
//! folder_timestamp = "creation"
//! folder_require_empty = true
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod builder;
mod cleaner;
mod config;
mod error;
mod listener;
mod policy;
mod reference_time;
mod report;

pub use builder::{CleanerBuilder, DefaultCleanerBuilder, LogCleanerBuilder};
pub use cleaner::{Cleaner, FileSystemCleaner, NoOpCleaner};
pub use config::{CleanerConfig, ReferenceKind};
pub use error::{CleanerError, ItemDeletionError, ItemStage, Result};
pub use listener::{DeletionListener, TracingListener};
pub use policy::DeletePolicy;
pub use reference_time::{FixedReference, NowReference, ReferenceTime, TodayFixedHour, TodayMidnight};
pub use report::CleanupReport;
