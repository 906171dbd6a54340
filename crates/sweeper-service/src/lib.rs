//! Sweeper Service
//!
//! Ties cleanup roots, a cleaner and a daily scheduler together into one
//! long-lived host.
//!
//! # Overview
//!
//! - Roots are registered by name and swept in name order
//! - A pass checks cancellation between roots and inside each root
//! - Lifecycle events go to a [`ServiceObserver`]; the default logs them
//! - After [`RetentionService::shutdown`] every call returns
//!   [`ServiceError::Disposed`]
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use sweeper_cleaner::NoOpCleaner;
//! use sweeper_domain::CancellationToken;
//! use sweeper_scheduler::DailyScheduler;
//! use sweeper_service::RetentionService;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RetentionService::new(DailyScheduler::midnight(), Arc::new(NoOpCleaner));
//! service.add_root("app", std::env::temp_dir())?;
//!
//! let report = service.sweep_now(&CancellationToken::new())?;
//! assert_eq!(report.roots.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod observer;
mod service;

pub use error::{Result, ServiceError};
pub use observer::{ServiceObserver, TracingObserver};
pub use service::RetentionService;
