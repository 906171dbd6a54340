//! Retention service: named roots swept on a daily schedule

use crate::error::{Result, ServiceError};
use crate::observer::{ServiceObserver, TracingObserver};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use sweeper_cleaner::{Cleaner, CleanerBuilder, CleanupReport, LogCleanerBuilder};
use sweeper_domain::{Cancellable, CancellationToken, RetentionWindow};
use sweeper_scheduler::{ActionFault, DailyScheduler, SchedulerState};

fn read<T: ?Sized>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T: ?Sized>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// State the scheduled action reaches into
struct Inner {
    roots: RwLock<BTreeMap<String, PathBuf>>,
    cleaner: RwLock<Arc<dyn Cleaner>>,
    observer: RwLock<Arc<dyn ServiceObserver>>,
}

impl Inner {
    fn observer(&self) -> Arc<dyn ServiceObserver> {
        read(&self.observer).clone()
    }

    /// One pass over a snapshot of the roots
    ///
    /// The end notification is sent even when the cleaner panics; the panic
    /// then continues to the caller.
    fn run_pass(&self, cancel: &CancellationToken) -> CleanupReport {
        let roots: Vec<PathBuf> = read(&self.roots).values().cloned().collect();
        let cleaner = read(&self.cleaner).clone();
        let observer = self.observer();

        observer.on_cleanup_start();
        let started = Instant::now();
        let mut report = CleanupReport::default();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for root in &roots {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                report.absorb(cleaner.cleanup_with_cancel(root, cancel));
            }
        }));

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        observer.on_cleanup_end(&report);

        if let Err(payload) = outcome {
            panic::resume_unwind(payload);
        }
        report
    }
}

/// Hosts a set of named cleanup roots, the cleaner applied to them and the
/// daily scheduler that triggers passes
///
/// Every operation fails with [`ServiceError::Disposed`] after
/// [`shutdown`](Self::shutdown).
///
/// # Examples
///
/// ```no_run
/// use sweeper_domain::RetentionWindow;
/// use sweeper_service::RetentionService;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = RetentionService::with_retention(RetentionWindow::from_days(30));
///     service.add_root("app", "/var/log/app")?;
///     service.start_cleanup_scheduler(true)?;
///
///     tokio::signal::ctrl_c().await?;
///     service.stop_cleanup_scheduler_async().await?;
///     service.shutdown();
///     Ok(())
/// }
/// ```
pub struct RetentionService {
    inner: Arc<Inner>,
    scheduler: Mutex<Arc<DailyScheduler>>,
    stop_timeout: Option<Duration>,
    disposed: AtomicBool,
}

impl Default for RetentionService {
    /// Log retention defaults with retention disabled
    fn default() -> Self {
        Self::with_retention(RetentionWindow::disabled())
    }
}

impl RetentionService {
    /// Create a service around an existing scheduler and cleaner
    ///
    /// The service installs its own fault listener on `scheduler`.
    pub fn new(scheduler: DailyScheduler, cleaner: Arc<dyn Cleaner>) -> Self {
        let inner = Arc::new(Inner {
            roots: RwLock::new(BTreeMap::new()),
            cleaner: RwLock::new(cleaner),
            observer: RwLock::new(Arc::new(TracingObserver)),
        });
        let scheduler = Self::attach(&inner, scheduler);
        Self {
            inner,
            scheduler: Mutex::new(scheduler),
            stop_timeout: None,
            disposed: AtomicBool::new(false),
        }
    }

    /// Midnight scheduler with the log cleaner preset
    pub fn with_retention(retention: RetentionWindow) -> Self {
        Self::new(
            DailyScheduler::midnight(),
            LogCleanerBuilder.build(retention),
        )
    }

    /// Replace the default tracing observer
    pub fn with_observer(self, observer: Arc<dyn ServiceObserver>) -> Self {
        *write(&self.inner.observer) = observer;
        self
    }

    /// Bound how long stopping waits for a running pass (`None` waits forever)
    pub fn with_stop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stop_timeout = timeout;
        self
    }

    fn attach(inner: &Arc<Inner>, scheduler: DailyScheduler) -> Arc<DailyScheduler> {
        let inner = Arc::clone(inner);
        Arc::new(scheduler.with_fault_listener(Arc::new(move |fault: &ActionFault| {
            inner.observer().on_scheduler_fault(fault)
        })))
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(ServiceError::Disposed);
        }
        Ok(())
    }

    fn current_scheduler(&self) -> Arc<DailyScheduler> {
        self.scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register `path` under `name`, returning the path it replaced
    pub fn add_root(
        &self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<Option<PathBuf>> {
        self.ensure_live()?;
        let name = name.into();
        let path = path.into();
        tracing::debug!(root = %name, path = %path.display(), "Registering cleanup root");
        Ok(write(&self.inner.roots).insert(name, path))
    }

    /// Unregister a root
    pub fn remove_root(&self, name: &str) -> Result<Option<PathBuf>> {
        self.ensure_live()?;
        Ok(write(&self.inner.roots).remove(name))
    }

    /// Whether a root is registered under `name`
    pub fn contains_root(&self, name: &str) -> Result<bool> {
        self.ensure_live()?;
        Ok(read(&self.inner.roots).contains_key(name))
    }

    /// Registered roots, ordered by name
    pub fn roots(&self) -> Result<Vec<(String, PathBuf)>> {
        self.ensure_live()?;
        Ok(read(&self.inner.roots)
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect())
    }

    /// Swap the cleaner; takes effect from the next pass
    pub fn set_cleaner(&self, cleaner: Arc<dyn Cleaner>) -> Result<()> {
        self.ensure_live()?;
        *write(&self.inner.cleaner) = cleaner;
        Ok(())
    }

    /// Swap the scheduler, stopping the current one first if it is started
    ///
    /// The new scheduler is not started.
    pub fn set_scheduler(&self, scheduler: DailyScheduler) -> Result<()> {
        self.ensure_live()?;
        let replacement = Self::attach(&self.inner, scheduler);
        let previous = std::mem::replace(
            &mut *self.scheduler.lock().unwrap_or_else(PoisonError::into_inner),
            replacement,
        );
        if previous.is_started() {
            previous.stop(self.stop_timeout)?;
        }
        Ok(())
    }

    /// Start scheduled cleanup; `Ok(false)` if it was already started
    pub fn start_cleanup_scheduler(&self, run_immediately: bool) -> Result<bool> {
        self.ensure_live()?;
        let scheduler = self.scheduler.lock().unwrap_or_else(PoisonError::into_inner);
        if scheduler.is_started() {
            return Ok(false);
        }

        let inner = Arc::clone(&self.inner);
        scheduler.start(
            move |cancel| {
                inner.run_pass(cancel);
                Ok(())
            },
            run_immediately,
        )?;
        Ok(true)
    }

    /// Stop scheduled cleanup, blocking until a running pass ends;
    /// `Ok(false)` if it was not started
    pub fn stop_cleanup_scheduler(&self) -> Result<bool> {
        self.ensure_live()?;
        let scheduler = self.current_scheduler();
        if !scheduler.is_started() {
            return Ok(false);
        }
        scheduler.stop(self.stop_timeout)?;
        Ok(true)
    }

    /// Async form of [`stop_cleanup_scheduler`](Self::stop_cleanup_scheduler)
    pub async fn stop_cleanup_scheduler_async(&self) -> Result<bool> {
        self.ensure_live()?;
        let scheduler = self.current_scheduler();
        if !scheduler.is_started() {
            return Ok(false);
        }
        scheduler.stop_async(self.stop_timeout).await?;
        Ok(true)
    }

    /// Whether scheduled cleanup is started
    pub fn is_scheduler_running(&self) -> bool {
        self.current_scheduler().is_started()
    }

    /// Lifecycle state of the current scheduler
    pub fn scheduler_state(&self) -> SchedulerState {
        self.current_scheduler().state()
    }

    /// Run one pass over every registered root on the calling thread
    pub fn sweep_now(&self, cancel: &CancellationToken) -> Result<CleanupReport> {
        self.ensure_live()?;
        Ok(self.inner.run_pass(cancel))
    }

    /// Stop scheduled cleanup and refuse every later call
    ///
    /// Errors while stopping are logged, not returned. Calling twice is a
    /// no-op.
    pub fn shutdown(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let scheduler = self.current_scheduler();
        if let Err(e) = scheduler.stop(self.stop_timeout) {
            tracing::warn!("Error stopping cleanup scheduler during shutdown: {}", e);
        }
        tracing::info!("Retention service shut down");
    }
}
