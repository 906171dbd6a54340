//! Output formatting for the CLI.

use crate::config::{OutputFormat, RootConfig};
use crate::error::Result;
use colored::*;
use sweeper_cleaner::CleanupReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a cleanup report.
    pub fn format_report(&self, report: &CleanupReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(report.total_deleted().to_string()),
        }
    }

    /// Format a report as a two-column table followed by failed paths.
    fn format_report_table(&self, report: &CleanupReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);

        let (files, folders) = if report.dry_run {
            (report.files_eligible, report.folders_eligible)
        } else {
            (report.files_deleted, report.folders_deleted)
        };
        let label = if report.dry_run { "to delete" } else { "deleted" };

        builder.push_record(["Roots".to_string(), report.roots.len().to_string()]);
        builder.push_record([
            "Directories scanned".to_string(),
            report.directories_scanned.to_string(),
        ]);
        builder.push_record([format!("Files {}", label), files.to_string()]);
        builder.push_record([format!("Folders {}", label), folders.to_string()]);
        builder.push_record(["Failures".to_string(), report.total_failures().to_string()]);
        builder.push_record(["Elapsed".to_string(), format!("{} ms", report.elapsed_ms)]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut out = table.to_string();

        if report.cancelled {
            out.push('\n');
            out.push_str(&self.warning("Sweep cancelled before completion"));
        }
        if !report.failed_paths.is_empty() {
            out.push('\n');
            out.push_str(&self.colorize("Failed paths:", "red"));
            for path in &report.failed_paths {
                out.push_str(&format!("\n  {}", path.display()));
            }
        }
        out
    }

    /// Format configured roots.
    pub fn format_roots(&self, roots: &[RootConfig]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(roots)?),
            OutputFormat::Quiet => Ok(roots
                .iter()
                .map(|r| r.path.display().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if roots.is_empty() {
                    return Ok(self.colorize("No roots configured.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Name", "Path"]);
                for root in roots {
                    builder.push_record([root.name.clone(), root.path.display().to_string()]);
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report() -> CleanupReport {
        let mut report = CleanupReport::for_root(&PathBuf::from("/var/log/app"));
        report.directories_scanned = 4;
        report.files_eligible = 3;
        report.files_deleted = 3;
        report.folders_eligible = 1;
        report.folders_deleted = 1;
        report.record_file_failure(&PathBuf::from("/var/log/app/locked.log"));
        report
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_report(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["files_deleted"], 3);
        assert_eq!(value["file_failures"], 1);
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_report(&report()).unwrap(), "4");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&report()).unwrap();
        assert!(output.contains("Files deleted"));
        assert!(output.contains("Failed paths:"));
        assert!(output.contains("locked.log"));
    }

    #[test]
    fn test_dry_run_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut report = report();
        report.dry_run = true;
        let output = formatter.format_report(&report).unwrap();
        assert!(output.contains("Files to delete"));
    }

    #[test]
    fn test_empty_roots() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_roots(&[]).unwrap();
        assert!(output.contains("No roots configured"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
