//! Periodic driver for batch passes
//!
//! The scheduler owns one background task that runs [`Monitor::check_all_due`]
//! on a fixed period until it is stopped. Stopping lets the check in flight
//! finish and skips the rest of the current pass.

use crate::monitor::service::Monitor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Period between batch passes when none is configured
pub const DEFAULT_CHECK_PERIOD: Duration = Duration::from_secs(600);

/// Runs batch passes on a fixed period
#[derive(Debug)]
pub struct Scheduler {
    monitor: Arc<Monitor>,
    period: Duration,
}

/// Controls a running scheduler
///
/// Dropping the handle without calling [`SchedulerHandle::stop`] also ends the
/// task after its current pass.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Scheduler {
    pub fn new(monitor: Arc<Monitor>, period: Duration) -> Self {
        Self { monitor, period }
    }

    /// Spawns the periodic task; the first pass starts immediately
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!("Scheduler started, batch pass every {:?}", self.period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }

                if *shutdown_rx.borrow() {
                    break;
                }

                match self.monitor.check_all_due_until(&shutdown_rx).await {
                    Ok(summary) => tracing::info!("Scheduled pass: {}", summary),
                    Err(e) => tracing::error!("Scheduled pass failed: {}", e),
                }
            }

            tracing::info!("Scheduler stopped");
        });

        SchedulerHandle { shutdown, task }
    }
}

impl SchedulerHandle {
    /// Signals shutdown and waits for the task to exit
    pub async fn stop(self) {
        // The receiver only disappears once the task has already exited
        let _ = self.shutdown.send(true);

        if let Err(e) = self.task.await {
            tracing::error!("Scheduler task ended abnormally: {}", e);
        }
    }
}
