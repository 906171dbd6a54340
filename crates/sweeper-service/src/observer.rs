//! Cleanup lifecycle notifications

use sweeper_cleaner::CleanupReport;
use sweeper_scheduler::ActionFault;

/// Receives cleanup lifecycle events from a [`RetentionService`](crate::RetentionService)
///
/// Every method has an empty default, so observers implement only what they
/// need. Calls arrive on the thread running the pass.
pub trait ServiceObserver: Send + Sync {
    /// A pass over the registered roots is starting
    fn on_cleanup_start(&self) {}

    /// A pass ended, normally, cancelled or by panic
    fn on_cleanup_end(&self, _report: &CleanupReport) {}

    /// A scheduled pass failed
    fn on_scheduler_fault(&self, _fault: &ActionFault) {}
}

/// Observer that logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ServiceObserver for TracingObserver {
    fn on_cleanup_start(&self) {
        tracing::debug!("Cleanup pass starting");
    }

    fn on_cleanup_end(&self, report: &CleanupReport) {
        tracing::info!(
            roots = report.roots.len(),
            deleted = report.total_deleted(),
            failures = report.total_failures(),
            cancelled = report.cancelled,
            "Cleanup pass finished"
        );
    }

    fn on_scheduler_fault(&self, fault: &ActionFault) {
        tracing::error!("Cleanup pass failed: {}", fault);
    }
}
