//! Flush Scheduler
//!
//! Periodic timer task that invokes the drain-and-deliver operation.
//! Idle -> Active happens at most once; Stopped is terminal.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// No timer running
    Idle,
    /// Timer running at a fixed period
    Active,
    /// Stopped by shutdown; never restarts
    Stopped,
}

struct SchedulerInner {
    state: SchedulerState,
    period: Option<Duration>,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

/// Owner of the periodic flush task
pub struct FlushScheduler {
    inner: Mutex<SchedulerInner>,
}

impl Default for FlushScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FlushScheduler {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SchedulerInner {
                state: SchedulerState::Idle,
                period: None,
                shutdown_tx: None,
                task: None,
            }),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.inner.lock().state
    }

    pub fn period(&self) -> Option<Duration> {
        self.inner.lock().period
    }

    /// Start the timer if Idle. `tick` runs once per period (first run one
    /// period after start) and returns `false` to end the task.
    ///
    /// Returns `true` only when this call started the timer. Requires a tokio
    /// runtime; without one the scheduler stays Idle.
    pub fn start<F, Fut>(&self, period: Duration, tick: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.state != SchedulerState::Idle {
            return false;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("No tokio runtime available - periodic flush disabled, use manual flush");
                return false;
            }
        };

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !tick().await {
                            log::debug!("Flush scheduler owner dropped, exiting");
                            break;
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        inner.state = SchedulerState::Active;
        inner.period = Some(period);
        inner.shutdown_tx = Some(shutdown_tx);
        inner.task = Some(task);

        log::info!("Flush scheduler started (every {}ms)", period.as_millis());
        true
    }

    /// Stop the timer and wait for an in-flight tick to finish
    pub async fn stop(&self) {
        let (shutdown_tx, task) = {
            let mut inner = self.inner.lock();
            if inner.state == SchedulerState::Stopped {
                return;
            }
            inner.state = SchedulerState::Stopped;
            (inner.shutdown_tx.take(), inner.task.take())
        };

        if let Some(tx) = shutdown_tx {
            let _ = tx.send(true);
        }
        if let Some(task) = task {
            if let Err(e) = task.await {
                log::warn!("Flush scheduler task ended abnormally: {}", e);
            }
            log::info!("Flush scheduler stopped");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
