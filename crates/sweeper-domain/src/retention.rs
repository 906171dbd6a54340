//! Retention window - how long an item is kept before it may be deleted

use std::fmt;
use std::time::Duration;

/// Maximum age an item may reach before it becomes eligible for deletion.
///
/// The window is explicitly optional: a disabled window means "never delete"
/// and every policy built on it answers `false` without touching the
/// filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RetentionWindow(Option<Duration>);

impl RetentionWindow {
    /// A window that disables deletion entirely
    pub const fn disabled() -> Self {
        Self(None)
    }

    /// A window of the given length
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use sweeper_domain::RetentionWindow;
    ///
    /// let window = RetentionWindow::of(Duration::from_secs(3600));
    /// assert!(window.is_enabled());
    /// ```
    pub const fn of(duration: Duration) -> Self {
        Self(Some(duration))
    }

    /// A window of `hours` hours
    pub const fn from_hours(hours: u64) -> Self {
        Self::of(Duration::from_secs(hours * 3600))
    }

    /// A window of `days` days
    pub const fn from_days(days: u64) -> Self {
        Self::of(Duration::from_secs(days * 86400))
    }

    /// Whether deletion is enabled at all
    pub const fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// The window length, if enabled
    pub const fn duration(&self) -> Option<Duration> {
        self.0
    }
}

impl From<Option<Duration>> for RetentionWindow {
    fn from(value: Option<Duration>) -> Self {
        Self(value)
    }
}

impl fmt::Display for RetentionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(d) => write!(f, "{}s", d.as_secs()),
            None => write!(f, "disabled"),
        }
    }
}
