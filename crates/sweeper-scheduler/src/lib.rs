//! Sweeper Scheduler
//!
//! Runs an action once per day at a fixed local time of day plus a small
//! offset, on a tokio runtime.
//!
//! # Guarantees
//!
//! - At most one execution of the action at a time; a fire that finds the
//!   previous one still running is dropped
//! - At most one execution per calendar date, even across stop and start
//! - A failing or panicking action is reported and never stops the schedule
//! - `stop` disarms the timer, signals cancellation and waits (optionally
//!   bounded) for the running action
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sweeper_scheduler::{ActionFault, DailyScheduler, SchedulerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SchedulerConfig::at(0, 0);
//!     let scheduler = DailyScheduler::from_config(&config)?
//!         .with_fault_listener(Arc::new(|fault: &ActionFault| eprintln!("{fault}")));
//!
//!     scheduler.start(|_cancel| Ok(()), config.run_immediately)?;
//!     tokio::signal::ctrl_c().await?;
//!     scheduler.stop_async(Some(Duration::from_secs(30))).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [schedule]
//! name = "cleanup"
//! run_at_hour = 0
//! run_at_minute = 0
//! offset_secs = 10
//! run_immediately = true
//! ```

#![warn(missing_docs)]

mod clock;
mod config;
mod error;
mod gate;
mod scheduler;

pub use clock::{Clock, LocalClock, ManualClock};
pub use config::SchedulerConfig;
pub use error::{ActionFault, Result, SchedulerError};
pub use scheduler::{next_due_delay, Action, DailyScheduler, FaultListener, SchedulerState};
