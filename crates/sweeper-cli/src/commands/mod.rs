//! Command implementations.

pub mod config;
pub mod run;
pub mod sweep;

pub use self::config::execute_config;
pub use self::run::execute_run;
pub use self::sweep::execute_sweep;

use crate::config::{Config, RootConfig};
use crate::error::Result;
use std::sync::Arc;
use sweeper_cleaner::CleanerConfig;
use sweeper_scheduler::DailyScheduler;
use sweeper_service::RetentionService;

/// Assemble a service from configuration with `roots` registered.
pub(crate) fn build_service(
    config: &Config,
    cleaner: &CleanerConfig,
    roots: &[RootConfig],
) -> Result<RetentionService> {
    let scheduler = DailyScheduler::from_config(&config.schedule)?;
    let service = RetentionService::new(scheduler, Arc::new(cleaner.build()?))
        .with_stop_timeout(config.stop_timeout());
    for root in roots {
        service.add_root(root.name.clone(), root.path.clone())?;
    }
    Ok(service)
}
