//! "Run completed" signal shared by the fire path and `stop`

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// Manual-reset event: closed while a fire is running, open otherwise.
///
/// Blocking waiters park on the condvar, async waiters on the `Notify`, so
/// `stop` never needs a runtime and `stop_async` never blocks a worker.
#[derive(Debug)]
pub(crate) struct RunGate {
    open: Mutex<bool>,
    cond: Condvar,
    notify: Notify,
}

impl RunGate {
    /// A gate that starts open (nothing running)
    pub(crate) fn new() -> Self {
        Self {
            open: Mutex::new(true),
            cond: Condvar::new(),
            notify: Notify::new(),
        }
    }

    /// Mark a run as in progress
    pub(crate) fn close(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    /// Mark the run as finished and wake every waiter
    pub(crate) fn open(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cond.notify_all();
        self.notify.notify_waiters();
    }

    pub(crate) fn is_open(&self) -> bool {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until open; `false` if `timeout` elapsed first
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> bool {
        let guard = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        match timeout {
            None => {
                let _open = self
                    .cond
                    .wait_while(guard, |open| !*open)
                    .unwrap_or_else(PoisonError::into_inner);
                true
            }
            Some(timeout) => {
                let (_open, result) = self
                    .cond
                    .wait_timeout_while(guard, timeout, |open| !*open)
                    .unwrap_or_else(PoisonError::into_inner);
                !result.timed_out()
            }
        }
    }

    /// Suspend until open; `false` if `timeout` elapsed first
    pub(crate) async fn wait_async(&self, timeout: Option<Duration>) -> bool {
        let opened = async {
            loop {
                let notified = self.notify.notified();
                tokio::pin!(notified);
                // Register before checking so an `open` in between is not lost.
                notified.as_mut().enable();
                if self.is_open() {
                    return;
                }
                notified.await;
            }
        };

        match timeout {
            None => {
                opened.await;
                true
            }
            Some(timeout) => tokio::time::timeout(timeout, opened).await.is_ok(),
        }
    }
}
