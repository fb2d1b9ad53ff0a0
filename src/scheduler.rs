use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::{Error, Result};
use crate::ping::ProbeOutcome;
use crate::ping_executor::Prober;
use crate::registry::StatsRegistry;
use crate::stats::{HostStatsTracker, HostStatus};

/// Runs one independent polling task per registered host.
///
/// Each task sleeps for `interval`, probes its host, applies the outcome and
/// repeats until [`shutdown`](Self::shutdown) is called. Probes already in
/// flight are allowed to finish or time out.
pub struct Scheduler<P> {
    registry: StatsRegistry,
    prober: Arc<P>,
    interval: Duration,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl<P> Scheduler<P>
where
    P: Prober + 'static,
{
    pub fn new(registry: StatsRegistry, prober: P, interval: Duration) -> Self {
        Self::with_shared_prober(registry, Arc::new(prober), interval)
    }

    pub fn with_shared_prober(registry: StatsRegistry, prober: Arc<P>, interval: Duration) -> Self {
        Self {
            registry,
            prober,
            interval,
            shutdown_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        }
    }

    pub fn registry(&self) -> &StatsRegistry {
        &self.registry
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Token cancelled when the scheduler shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Spawns the per-host tasks. Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<()> {
        if self.task_tracker.is_closed() {
            return Err(Error::AlreadyStarted);
        }

        for tracker in self.registry.trackers() {
            self.task_tracker.spawn(monitor_host(
                Arc::clone(tracker),
                Arc::clone(&self.prober),
                self.interval,
                self.shutdown_token.clone(),
            ));
        }
        self.task_tracker.close();

        info!(
            "started monitoring {} host(s) every {}",
            self.registry.len(),
            humantime::format_duration(self.interval)
        );
        Ok(())
    }

    /// Stops every host task and waits for them to exit.
    pub async fn shutdown(&self) {
        info!("scheduler shutting down...");

        self.shutdown_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("scheduler shutdown");
    }
}

async fn monitor_host<P>(
    tracker: Arc<HostStatsTracker>,
    prober: Arc<P>,
    period: Duration,
    shutdown_token: CancellationToken,
) where
    P: Prober + ?Sized,
{
    let host = tracker.host();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = shutdown_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let outcome = prober.probe(host).await;
        let before = tracker.apply(outcome);
        log_transition(host, before, outcome);
    }

    debug!("{host}: monitoring stopped");
}

fn log_transition(host: &str, before: HostStatus, outcome: ProbeOutcome) {
    match (before, outcome) {
        (HostStatus::Up | HostStatus::Unknown, ProbeOutcome::Failure) => {
            warn!("{host} is down");
        }
        (HostStatus::Down | HostStatus::Unknown, ProbeOutcome::Success { round_trip_ms }) => {
            info!("{host} is up ({round_trip_ms:.2} ms)");
        }
        _ => debug!("{host}: {outcome}"),
    }
}
