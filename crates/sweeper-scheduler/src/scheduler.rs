//! Daily time-of-day scheduler

use crate::clock::{Clock, LocalClock};
use crate::config::SchedulerConfig;
use crate::error::{ActionFault, Result, SchedulerError};
use crate::gate::RunGate;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use sweeper_domain::{Cancellable, CancellationToken};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const ONE_DAY: Duration = Duration::from_secs(86_400);

/// The work a scheduler runs once per day
///
/// Receives the token of the current arming; a cooperative action polls it
/// and returns early once `stop` has been requested.
pub type Action = Arc<dyn Fn(&CancellationToken) -> anyhow::Result<()> + Send + Sync>;

/// Receives faults raised by scheduled actions
pub trait FaultListener: Send + Sync {
    /// Called on the firing thread after the fault has been logged
    fn on_fault(&self, fault: &ActionFault);
}

impl<F> FaultListener for F
where
    F: Fn(&ActionFault) + Send + Sync,
{
    fn on_fault(&self, fault: &ActionFault) {
        self(fault)
    }
}

/// Observable lifecycle state of a [`DailyScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer armed and no action running
    Idle,
    /// Timer armed, waiting for the next due time
    Armed,
    /// The action is executing
    Running,
    /// `stop` is waiting for the running action
    Stopping,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Armed => "armed",
            SchedulerState::Running => "running",
            SchedulerState::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// What a single timer expiry did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FireOutcome {
    /// A previous fire was still running
    Dropped,
    /// Stop was requested before the action began
    Cancelled,
    /// The action already ran today
    Duplicate,
    /// No action registered
    NoAction,
    /// The action completed
    Ran,
    /// The action returned an error or panicked
    Faulted,
}

/// Delay from `now` until the next `date + time_of_day + offset` strictly
/// after `now`.
///
/// A target equal to `now` counts as passed and rolls to the next day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use std::time::Duration;
/// use sweeper_scheduler::next_due_delay;
///
/// let now = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(23, 59, 0).unwrap();
/// let delay = next_due_delay(now, Duration::ZERO, Duration::from_secs(10));
/// assert_eq!(delay, Duration::from_secs(70));
/// ```
pub fn next_due_delay(now: NaiveDateTime, time_of_day: Duration, offset: Duration) -> Duration {
    let midnight = NaiveDateTime::new(now.date(), NaiveTime::MIN);
    let after_midnight = TimeDelta::from_std(time_of_day + offset).unwrap_or(TimeDelta::zero());
    let mut target = midnight
        .checked_add_signed(after_midnight)
        .unwrap_or(NaiveDateTime::MAX);
    while target <= now {
        match target.checked_add_signed(TimeDelta::days(1)) {
            Some(next) => target = next,
            None => return Duration::ZERO,
        }
    }
    (target - now).to_std().unwrap_or_default()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "action panicked".to_string()
    }
}

/// Immutable settings fixed at construction
#[derive(Clone)]
struct Settings {
    name: String,
    time_of_day: Duration,
    offset: Duration,
    clock: Arc<dyn Clock>,
    fault_listener: Option<Arc<dyn FaultListener>>,
}

/// State shared between the owner and the timer task
struct Shared {
    settings: Settings,
    action: Mutex<Option<Action>>,
    last_fire: Mutex<Option<NaiveDate>>,
    running: AtomicBool,
    /// Stop calls still waiting for the gate
    stoppers: AtomicUsize,
    completed: RunGate,
}

/// Releases the reentrancy flag and opens the gate when a fire ends,
/// including by panic.
struct RunGuard<'a>(&'a Shared);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Release);
        self.0.completed.open();
    }
}

impl Shared {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            action: Mutex::new(None),
            last_fire: Mutex::new(None),
            running: AtomicBool::new(false),
            stoppers: AtomicUsize::new(0),
            completed: RunGate::new(),
        }
    }

    fn delay_until_next(&self) -> Duration {
        next_due_delay(
            self.settings.clock.now(),
            self.settings.time_of_day,
            self.settings.offset,
        )
    }

    /// One timer expiry. Runs on a blocking thread.
    fn fire(&self, token: &CancellationToken) -> FireOutcome {
        let name = self.settings.name.as_str();

        if self.running.swap(true, Ordering::AcqRel) {
            tracing::warn!(scheduler = name, "Previous run still in progress, fire dropped");
            return FireOutcome::Dropped;
        }
        self.completed.close();
        let _guard = RunGuard(self);

        if token.is_cancelled() {
            tracing::debug!(scheduler = name, "Stop requested before fire, skipping");
            return FireOutcome::Cancelled;
        }

        let Some(action) = lock(&self.action).clone() else {
            return FireOutcome::NoAction;
        };

        let today = self.settings.clock.now().date();
        {
            let mut last = lock(&self.last_fire);
            if *last == Some(today) {
                tracing::debug!(scheduler = name, %today, "Already ran today, skipping");
                return FireOutcome::Duplicate;
            }
            // Recorded before the action runs, so a failed run still counts.
            *last = Some(today);
        }

        tracing::info!(scheduler = name, %today, "Running scheduled action");
        let (panicked, error) = match panic::catch_unwind(AssertUnwindSafe(|| action(token))) {
            Ok(Ok(())) => {
                tracing::debug!(scheduler = name, "Scheduled action completed");
                return FireOutcome::Ran;
            }
            Ok(Err(error)) => (false, error),
            Err(payload) => (true, anyhow::anyhow!(panic_message(payload.as_ref()))),
        };

        let fault = ActionFault {
            scheduler: name.to_string(),
            fired_on: today,
            panicked,
            error,
        };
        self.report(&fault);
        FireOutcome::Faulted
    }

    fn report(&self, fault: &ActionFault) {
        tracing::error!(
            scheduler = %fault.scheduler,
            panicked = fault.panicked,
            "Scheduled action failed: {:#}",
            fault.error
        );
        if let Some(listener) = &self.settings.fault_listener {
            listener.on_fault(fault);
        }
    }
}

/// Timer task: sleep until due, fire, re-arm. Exits on shutdown signal or
/// once its arming has been cancelled.
async fn run_timer(
    shared: Arc<Shared>,
    first_due: Duration,
    token: CancellationToken,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut due = first_due;
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(due) => {}
        }

        let fire_shared = shared.clone();
        let fire_token = token.clone();
        let outcome = match tokio::task::spawn_blocking(move || fire_shared.fire(&fire_token)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(scheduler = %shared.settings.name, "Fire task failed: {}", e);
                FireOutcome::Faulted
            }
        };

        if outcome == FireOutcome::Cancelled || token.is_cancelled() {
            break;
        }

        due = shared.delay_until_next();
        tracing::debug!(
            scheduler = %shared.settings.name,
            ?outcome,
            "Timer re-armed, next fire in {}s",
            due.as_secs()
        );
    }
}

/// One arming of the timer. Swapped as a unit so a stale timer can never
/// outlive its stop.
struct Arm {
    timer: Option<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
    token: CancellationToken,
}

impl Arm {
    fn inert() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            timer: None,
            shutdown,
            token: CancellationToken::new(),
        }
    }

    fn is_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    fn signal(&self) {
        self.token.cancel();
        self.shutdown.send_replace(true);
    }

    fn dispose(self) {
        if let Some(timer) = self.timer {
            timer.abort();
        }
    }
}

/// Runs an action once per day at a fixed local time of day plus an offset
///
/// The timer lives on a tokio runtime; the action itself runs on the
/// blocking pool so a long sweep never stalls async work. At most one
/// action runs at a time, and at most one per calendar date.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use sweeper_scheduler::DailyScheduler;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // 02:30 local time, 10 seconds past
///     let scheduler = DailyScheduler::new(Duration::from_secs(9000), None)?;
///     scheduler.start(|_cancel| {
///         println!("daily work");
///         Ok(())
///     }, false)?;
///
///     tokio::signal::ctrl_c().await?;
///     scheduler.stop_async(Some(Duration::from_secs(30))).await?;
///     Ok(())
/// }
/// ```
pub struct DailyScheduler {
    shared: Arc<Shared>,
    arm: Mutex<Arm>,
    runtime: Option<Handle>,
}

impl fmt::Debug for DailyScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyScheduler")
            .field("name", &self.shared.settings.name)
            .field("time_of_day", &self.shared.settings.time_of_day)
            .field("offset", &self.shared.settings.offset)
            .field("state", &self.state())
            .finish()
    }
}

impl DailyScheduler {
    /// Default safety offset added after the time of day
    pub const DEFAULT_OFFSET: Duration = Duration::from_secs(10);

    /// Create a scheduler firing at `time_of_day` after local midnight,
    /// plus `offset` (10 seconds when `None`)
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Config` if `time_of_day` or `offset` is a day or longer.
    pub fn new(time_of_day: Duration, offset: Option<Duration>) -> Result<Self> {
        if time_of_day >= ONE_DAY {
            return Err(SchedulerError::Config(format!(
                "time of day must be less than 24h, got {:?}",
                time_of_day
            )));
        }
        let offset = offset.unwrap_or(Self::DEFAULT_OFFSET);
        if offset >= ONE_DAY {
            return Err(SchedulerError::Config(format!(
                "offset must be less than 24h, got {:?}",
                offset
            )));
        }

        let settings = Settings {
            name: "daily".to_string(),
            time_of_day,
            offset,
            clock: Arc::new(LocalClock),
            fault_listener: None,
        };
        Ok(Self {
            shared: Arc::new(Shared::new(settings)),
            arm: Mutex::new(Arm::inert()),
            runtime: None,
        })
    }

    /// Fire shortly after local midnight (00:00:10)
    pub fn midnight() -> Self {
        let settings = Settings {
            name: "midnight".to_string(),
            time_of_day: Duration::ZERO,
            offset: Self::DEFAULT_OFFSET,
            clock: Arc::new(LocalClock),
            fault_listener: None,
        };
        Self {
            shared: Arc::new(Shared::new(settings)),
            arm: Mutex::new(Arm::inert()),
            runtime: None,
        }
    }

    /// Build from configuration
    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        Ok(Self::new(config.time_of_day()?, Some(config.offset()))?.with_name(&config.name))
    }

    fn reconfigure(mut self, update: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = self.shared.settings.clone();
        update(&mut settings);
        self.shared = Arc::new(Shared::new(settings));
        self
    }

    /// Name used in logs and fault reports. Call before `start`.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.reconfigure(|s| s.name = name)
    }

    /// Plan against `clock` instead of the local clock. Call before `start`.
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        self.reconfigure(|s| s.clock = clock)
    }

    /// Receive action faults. Call before `start`.
    pub fn with_fault_listener(self, listener: Arc<dyn FaultListener>) -> Self {
        self.reconfigure(|s| s.fault_listener = Some(listener))
    }

    /// Spawn the timer on `runtime` instead of the ambient one
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Scheduler name
    pub fn name(&self) -> &str {
        &self.shared.settings.name
    }

    /// Configured time of day
    pub fn time_of_day(&self) -> Duration {
        self.shared.settings.time_of_day
    }

    /// Configured offset
    pub fn offset(&self) -> Duration {
        self.shared.settings.offset
    }

    /// Delay until the next due time, measured on the scheduler's clock
    pub fn next_due_in(&self) -> Duration {
        self.shared.delay_until_next()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        if self.shared.stoppers.load(Ordering::Acquire) > 0 {
            SchedulerState::Stopping
        } else if self.shared.running.load(Ordering::Acquire) {
            SchedulerState::Running
        } else if lock(&self.arm).is_armed() {
            SchedulerState::Armed
        } else {
            SchedulerState::Idle
        }
    }

    /// True while the action is executing
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// True while a timer is armed or the action is executing
    pub fn is_started(&self) -> bool {
        self.is_running() || lock(&self.arm).is_armed()
    }

    /// Date of the most recent fire that claimed its day
    pub fn last_fire_date(&self) -> Option<NaiveDate> {
        *lock(&self.shared.last_fire)
    }

    fn runtime_handle(&self) -> Result<Handle> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|e| SchedulerError::Worker(e.to_string())),
        }
    }

    /// Arm the timer
    ///
    /// With `run_immediately` the first fire happens right away (still
    /// subject to the once-per-date rule), otherwise at the next due time.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::AlreadyStarted` if armed or an action is still running
    /// - `SchedulerError::Worker` if no tokio runtime is available
    pub fn start<F>(&self, action: F, run_immediately: bool) -> Result<()>
    where
        F: Fn(&CancellationToken) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let runtime = self.runtime_handle()?;

        let mut arm = lock(&self.arm);
        if arm.is_armed() || self.shared.running.load(Ordering::Acquire) {
            return Err(SchedulerError::AlreadyStarted);
        }

        *lock(&self.shared.action) = Some(Arc::new(action));

        let due = if run_immediately {
            Duration::ZERO
        } else {
            self.shared.delay_until_next()
        };
        let token = CancellationToken::new();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let timer = runtime.spawn(run_timer(
            self.shared.clone(),
            due,
            token.clone(),
            shutdown_rx,
        ));

        let previous = std::mem::replace(
            &mut *arm,
            Arm {
                timer: Some(timer),
                shutdown,
                token,
            },
        );
        drop(arm);
        previous.dispose();

        tracing::info!(
            scheduler = %self.shared.settings.name,
            "Scheduler started (first fire in {}s)",
            due.as_secs()
        );
        Ok(())
    }

    /// Take the current arming out and signal it
    fn detach(&self) -> Arm {
        let old = std::mem::replace(&mut *lock(&self.arm), Arm::inert());
        self.shared.stoppers.fetch_add(1, Ordering::AcqRel);
        old.signal();
        old
    }

    fn finish_stop(&self, old: Arm, completed: bool, timeout: Option<Duration>) -> Result<()> {
        self.shared.stoppers.fetch_sub(1, Ordering::AcqRel);
        if !completed {
            // The detached timer exits by itself once the action returns.
            tracing::warn!(
                scheduler = %self.shared.settings.name,
                "Stop timed out while the action was still running"
            );
            return Err(SchedulerError::Timeout(timeout.unwrap_or_default()));
        }
        old.dispose();
        tracing::info!(scheduler = %self.shared.settings.name, "Scheduler stopped");
        Ok(())
    }

    /// Cancel the timer and wait for a running action, blocking the caller
    ///
    /// `None` waits without limit. Safe to call when not started. On a
    /// current-thread runtime prefer [`stop_async`](Self::stop_async).
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Timeout` if the action is still running when
    /// `timeout` elapses. The scheduler is disarmed either way.
    pub fn stop(&self, timeout: Option<Duration>) -> Result<()> {
        let old = self.detach();
        let completed = self.shared.completed.wait(timeout);
        self.finish_stop(old, completed, timeout)
    }

    /// Async form of [`stop`](Self::stop)
    pub async fn stop_async(&self, timeout: Option<Duration>) -> Result<()> {
        let old = self.detach();
        let completed = self.shared.completed.wait_async(timeout).await;
        self.finish_stop(old, completed, timeout)
    }

    /// Stop without limit and release everything, swallowing errors
    pub fn dispose(self) {
        if let Err(e) = self.stop(None) {
            tracing::debug!(scheduler = %self.shared.settings.name, "Error during dispose: {}", e);
        }
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        // Never blocks: a running action finishes on its own thread.
        let old = std::mem::replace(&mut *lock(&self.arm), Arm::inert());
        old.signal();
    }
}
