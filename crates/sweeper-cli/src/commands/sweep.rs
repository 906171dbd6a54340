//! Sweep command implementation.

use crate::cli::SweepArgs;
use crate::commands::build_service;
use crate::config::{Config, RootConfig};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::sync::Arc;
use sweeper_cleaner::CleanupReport;
use sweeper_domain::{Cancellable, CancellationToken};

/// Execute the sweep command.
///
/// Runs one pass on the blocking pool; Ctrl+C cancels it cooperatively and
/// the partial report is still printed.
pub async fn execute_sweep(
    args: SweepArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<CleanupReport> {
    let mut cleaner = config.cleaner.clone();
    if let Some(hours) = args.retention_hours {
        cleaner.retention_hours = Some(hours);
    }
    cleaner.dry_run |= args.dry_run;

    let roots = select_roots(&args, config)?;
    let service = Arc::new(build_service(config, &cleaner, &roots)?);

    let cancel = CancellationToken::new();
    let worker = Arc::clone(&service);
    let worker_cancel = cancel.clone();
    let mut task = tokio::task::spawn_blocking(move || worker.sweep_now(&worker_cancel));

    let report = tokio::select! {
        joined = &mut task => joined??,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, cancelling sweep");
            cancel.cancel();
            task.await??
        }
    };

    println!("{}", formatter.format_report(&report)?);
    Ok(report)
}

/// Paths from the command line, or the configured roots.
fn select_roots(args: &SweepArgs, config: &Config) -> Result<Vec<RootConfig>> {
    if args.paths.is_empty() {
        if config.roots.is_empty() {
            return Err(CliError::InvalidInput(
                "No paths given and no roots configured".to_string(),
            ));
        }
        return Ok(config.roots.clone());
    }

    Ok(args
        .paths
        .iter()
        .map(|path| RootConfig {
            name: path.display().to_string(),
            path: path.clone(),
        })
        .collect())
}
