//! Configuration for cleanup passes
//!
//! Selects the retention window, the reference time and the timestamps the
//! file and folder policies read.

use crate::cleaner::FileSystemCleaner;
use crate::error::{CleanerError, Result};
use crate::policy::DeletePolicy;
use crate::reference_time::{NowReference, ReferenceTime, TodayFixedHour, TodayMidnight};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use sweeper_domain::{RetentionWindow, TimestampSource};

/// Which reference time source a cleaner uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Live current time
    Now,
    /// Today at 00:00
    Midnight,
    /// Today at `fixed_hour`
    FixedHour,
}

/// Configuration for a filesystem cleaner
///
/// # Examples
///
/// ```
/// use sweeper_cleaner::CleanerConfig;
///
/// // Default: log rotation preset, 30 days
/// let config = CleanerConfig::default();
/// assert_eq!(config.retention_hours, Some(30 * 24));
///
/// // Creation-time based cleanup against the live clock
/// let config = CleanerConfig::creation_based(72);
/// assert_eq!(config.retention_hours, Some(72));
///
/// // Never delete anything
/// let config = CleanerConfig::disabled();
/// assert!(!config.retention().is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Retention window in hours; absent disables deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_hours: Option<u64>,

    /// Reference time source
    /// Default: midnight
    #[serde(default = "default_reference")]
    pub reference: ReferenceKind,

    /// Hour (0-23) used when `reference = "fixed_hour"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_hour: Option<u32>,

    /// Timestamp read for files
    /// Default: last write
    #[serde(default = "default_file_timestamp")]
    pub file_timestamp: TimestampSource,

    /// Timestamp read for folders
    /// Default: creation
    #[serde(default = "default_folder_timestamp")]
    pub folder_timestamp: TimestampSource,

    /// Only delete folders that are empty
    /// Default: true
    #[serde(default = "default_true")]
    pub folder_require_empty: bool,

    /// Dry-run mode: log what would be deleted without deleting
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

fn default_reference() -> ReferenceKind {
    ReferenceKind::Midnight
}

fn default_file_timestamp() -> TimestampSource {
    TimestampSource::LastWrite
}

fn default_folder_timestamp() -> TimestampSource {
    TimestampSource::Creation
}

fn default_true() -> bool {
    true
}

impl Default for CleanerConfig {
    /// Log rotation preset
    ///
    /// - Retention: 30 days
    /// - Reference: today at midnight
    /// - Files: last write time
    /// - Folders: creation time, must be empty
    fn default() -> Self {
        Self {
            retention_hours: Some(30 * 24),
            reference: ReferenceKind::Midnight,
            fixed_hour: None,
            file_timestamp: TimestampSource::LastWrite,
            folder_timestamp: TimestampSource::Creation,
            folder_require_empty: true,
            dry_run: false,
        }
    }
}

impl CleanerConfig {
    /// Creation-time preset against the live clock
    pub fn creation_based(retention_hours: u64) -> Self {
        Self {
            retention_hours: Some(retention_hours),
            reference: ReferenceKind::Now,
            fixed_hour: None,
            file_timestamp: TimestampSource::Creation,
            folder_timestamp: TimestampSource::Creation,
            folder_require_empty: false,
            dry_run: false,
        }
    }

    /// Preset that never deletes
    pub fn disabled() -> Self {
        Self {
            retention_hours: None,
            ..Self::default()
        }
    }

    /// Get the retention window
    pub fn retention(&self) -> RetentionWindow {
        self.retention_hours
            .map(|hours| Duration::from_secs(hours.saturating_mul(3600)))
            .into()
    }

    /// Check the configuration for inconsistencies
    pub fn validate(&self) -> Result<()> {
        match (self.reference, self.fixed_hour) {
            (ReferenceKind::FixedHour, None) => Err(CleanerError::Config(
                "reference = \"fixed_hour\" requires fixed_hour".into(),
            )),
            (_, Some(hour)) if hour >= 24 => Err(CleanerError::Config(format!(
                "fixed_hour must be in 0..24, got {}",
                hour
            ))),
            _ => Ok(()),
        }
    }

    /// Build the configured reference time source
    pub fn reference_source(&self) -> Result<Arc<dyn ReferenceTime>> {
        self.validate()?;
        Ok(match self.reference {
            ReferenceKind::Now => Arc::new(NowReference),
            ReferenceKind::Midnight => Arc::new(TodayMidnight),
            ReferenceKind::FixedHour => {
                Arc::new(TodayFixedHour::new(self.fixed_hour.unwrap_or_default())?)
            }
        })
    }

    /// Build a cleaner from this configuration
    pub fn build(&self) -> Result<FileSystemCleaner> {
        let reference = self.reference_source()?;
        let retention = self.retention();

        Ok(FileSystemCleaner::new(
            DeletePolicy::file(self.file_timestamp, retention, reference.clone()),
            DeletePolicy::folder(self.folder_timestamp, self.folder_require_empty, retention, reference),
        )
        .with_dry_run(self.dry_run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleanerConfig::default();
        assert_eq!(config.retention_hours, Some(720));
        assert_eq!(config.reference, ReferenceKind::Midnight);
        assert_eq!(config.file_timestamp, TimestampSource::LastWrite);
        assert_eq!(config.folder_timestamp, TimestampSource::Creation);
        assert!(config.folder_require_empty);
        assert!(!config.dry_run);
        assert_eq!(config.retention(), RetentionWindow::from_days(30));
    }

    #[test]
    fn test_disabled_config() {
        let config = CleanerConfig::disabled();
        assert!(!config.retention().is_enabled());
        let cleaner = config.build().unwrap();
        assert!(!cleaner.file_policy().retention().is_enabled());
    }

    #[test]
    fn test_fixed_hour_validation() {
        let mut config = CleanerConfig {
            reference: ReferenceKind::FixedHour,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CleanerError::Config(_))));

        config.fixed_hour = Some(24);
        assert!(config.build().is_err());

        config.fixed_hour = Some(6);
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_build_applies_settings() {
        let config = CleanerConfig {
            dry_run: true,
            folder_require_empty: false,
            ..CleanerConfig::creation_based(48)
        };
        let cleaner = config.build().unwrap();
        assert!(cleaner.is_dry_run());
        assert!(!cleaner.folder_policy().require_empty());
        assert_eq!(cleaner.file_policy().source(), TimestampSource::Creation);
        assert_eq!(cleaner.file_policy().retention(), RetentionWindow::from_hours(48));
    }

    #[test]
    fn test_toml_parsing_with_defaults() {
        let config: CleanerConfig = toml::from_str(
            r#"
            retention_hours = 24
            file_timestamp = "creation"
            "#,
        )
        .unwrap();

        assert_eq!(config.retention_hours, Some(24));
        assert_eq!(config.file_timestamp, TimestampSource::Creation);
        assert_eq!(config.reference, ReferenceKind::Midnight);
        assert!(config.folder_require_empty);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = CleanerConfig::creation_based(12);
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: CleanerConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
