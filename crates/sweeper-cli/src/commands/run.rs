//! Run command implementation.

use crate::cli::RunArgs;
use crate::commands::build_service;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the run command: schedule daily cleanup until Ctrl+C.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if config.roots.is_empty() {
        return Err(CliError::InvalidInput(
            "No roots configured; add a [[roots]] entry to the config file".to_string(),
        ));
    }

    let service = build_service(config, &config.cleaner, &config.roots)?;
    let run_immediately = args.now || config.schedule.run_immediately;
    service.start_cleanup_scheduler(run_immediately)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Cleaning {} root(s) daily at {:02}:{:02} (+{}s)",
            config.roots.len(),
            config.schedule.run_at_hour,
            config.schedule.run_at_minute,
            config.schedule.offset_secs
        ))
    );
    println!("{}", formatter.info("Press Ctrl+C to stop"));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping scheduler");

    service.stop_cleanup_scheduler_async().await?;
    service.shutdown();
    println!("{}", formatter.success("Scheduler stopped"));
    Ok(())
}
