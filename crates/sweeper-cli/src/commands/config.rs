//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(config, formatter),
        ConfigAction::Init { force } => init_config(path, force, formatter),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Print the effective configuration.
fn show_config(config: &Config, formatter: &Formatter) -> Result<()> {
    match formatter.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Quiet => println!("{}", formatter.format_roots(&config.roots)?),
        OutputFormat::Table => {
            println!("{}", formatter.format_roots(&config.roots)?);
            println!();
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}

/// Write a default configuration file.
fn init_config(path: &Path, force: bool, formatter: &Formatter) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save_to(path)?;
    println!(
        "{}",
        formatter.success(&format!("Wrote default configuration to {}", path.display()))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        init_config(&path, false, &formatter).unwrap();
        assert!(path.exists());
        assert!(matches!(
            init_config(&path, false, &formatter),
            Err(CliError::InvalidInput(_))
        ));
        init_config(&path, true, &formatter).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
