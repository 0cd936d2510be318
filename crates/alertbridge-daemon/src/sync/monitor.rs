//! Periodic monitor loop.
//!
//! One background task ticks every [`CHECK_INTERVAL`] and runs
//! [`AlertEngine::run_tick`]. The first tick fires one full interval after
//! start. A stop request is observed between ticks, so an in-flight tick
//! always completes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::engine::{AlertEngine, TickSummary};

/// Time between ticks.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Drives [`AlertEngine`] on a fixed interval.
pub struct Monitor {
    engine: Arc<AlertEngine>,
    interval: Duration,
}

impl Monitor {
    pub const fn new(engine: Arc<AlertEngine>) -> Self {
        Self::with_interval(engine, CHECK_INTERVAL)
    }

    pub const fn with_interval(engine: Arc<AlertEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Run a single tick now.
    pub async fn run_once(&self) -> TickSummary {
        self.engine.run_tick().await
    }

    /// Start the background loop.
    pub fn spawn(self) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(self.engine, self.interval, shutdown_rx));
        MonitorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

async fn run_loop(
    engine: Arc<AlertEngine>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_secs = interval.as_secs(), "Alert monitor started");

    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the first immediate tick.
    timer.tick().await;

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }
        tokio::select! {
            _ = timer.tick() => {
                let summary = engine.run_tick().await;
                info!(
                    alerts = summary.alerts_seen,
                    created = summary.tickets_created,
                    closed = summary.alerts_closed,
                    failures = summary.alert_failures,
                    closure_checked = summary.closure.checked,
                    closure_closed = summary.closure.closed,
                    "Monitor tick complete"
                );
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Alert monitor stopped");
}

/// Handle to a running [`Monitor`]. Dropping it also stops the loop.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Ask the loop to stop after any in-flight tick. Calling it again is a
    /// no-op.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Monitor task ended abnormally");
        }
    }
}
