//! Sweeper Domain Layer
//!
//! This crate holds the primitives shared by the cleanup engine, the scheduler
//! and the service layer. It has no required external dependencies (serde
//! support is behind the `serde` feature) so that every other crate can depend
//! on it without pulling in a runtime or a clock library.
//!
//! ## Key Concepts
//!
//! - **Retention window**: maximum age an item may reach before it becomes
//!   eligible for deletion. An absent window disables deletion.
//! - **Filesystem entry**: the timestamps and shape of a file or folder as seen
//!   at the moment a policy inspects it.
//! - **Timestamp source**: which recorded timestamp (creation or last write) a
//!   policy measures age against.
//! - **Cancellation token**: cooperative stop signal handed to long sweeps.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod entry;
pub mod retention;

// Re-exports for convenience
pub use cancel::{Cancellable, CancellationToken};
pub use entry::{EntryKind, FilesystemEntry, TimestampSource};
pub use retention::RetentionWindow;
