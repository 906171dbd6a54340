//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sweeper_cleaner::CleanerConfig;
use sweeper_scheduler::SchedulerConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directories swept by `run` and by `sweep` without paths
    #[serde(default)]
    pub roots: Vec<RootConfig>,

    /// Retention policy
    #[serde(default)]
    pub cleaner: CleanerConfig,

    /// Daily schedule
    #[serde(default)]
    pub schedule: SchedulerConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// A named cleanup root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Unique name
    pub name: String,

    /// Directory to clean
    pub path: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Seconds `run` waits for an in-flight pass on shutdown (absent: no limit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_timeout_secs: Option<u64>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".sweeper").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::path(),
        }
    }

    /// Load configuration from file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check sections and root names.
    pub fn validate(&self) -> Result<()> {
        self.cleaner.validate()?;
        self.schedule.time_of_day()?;

        let mut names: Vec<&str> = self.roots.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(CliError::Config(format!("Duplicate root name '{}'", dup[0])));
        }
        Ok(())
    }

    /// Stop timeout as a duration.
    pub fn stop_timeout(&self) -> Option<Duration> {
        self.settings.stop_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            stop_timeout_secs: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.roots.is_empty());
        assert!(config.settings.color);
        assert_eq!(config.cleaner.retention_hours, Some(720));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.roots.push(RootConfig {
            name: "app".to_string(),
            path: PathBuf::from("/var/log/app"),
        });
        config.settings.stop_timeout_secs = Some(30);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.stop_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[[roots]]
name = "app"
path = "/var/log/app"

[schedule]
run_at_hour = 3
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.schedule.run_at_hour, 3);
        assert_eq!(config.schedule.offset_secs, 10);
        assert_eq!(config.cleaner, CleanerConfig::default());
    }

    #[test]
    fn test_duplicate_root_names_rejected() {
        let mut config = Config::default();
        for path in ["/a", "/b"] {
            config.roots.push(RootConfig {
                name: "logs".to_string(),
                path: PathBuf::from(path),
            });
        }
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[schedule]\nrun_at_hour = 24\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CliError::Scheduler(_))
        ));
    }
}
