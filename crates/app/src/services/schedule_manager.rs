//! Schedule manager — keeps the host powered on only during operating hours.

use std::sync::Arc;
use std::time::Duration;

use esxi_manager_domain::power::PowerTransition;
use esxi_manager_domain::schedule::OperatingHours;
use esxi_manager_domain::time::{Timestamp, now};
use tokio_util::sync::CancellationToken;

use crate::ports::PowerController;
use crate::services::power_service::PowerService;

/// Background loop reconciling the host's power state with the schedule.
///
/// The manager tracks what it *believes* the power state is. The belief is
/// seeded by one probe at start-up and afterwards only flips when the manager
/// itself runs a procedure.
pub struct ScheduleManager<P> {
    power: Arc<PowerService<P>>,
    hours: OperatingHours,
    interval: Duration,
    online: bool,
}

impl<P> ScheduleManager<P>
where
    P: PowerController + Send + Sync + 'static,
{
    /// Probe the host once and build a manager around the result.
    pub async fn start(
        power: Arc<PowerService<P>>,
        hours: OperatingHours,
        interval: Duration,
    ) -> Self {
        let online = power.is_reachable().await;
        tracing::info!(online, "server online on manager start-up");
        Self::with_state(power, hours, interval, online)
    }

    /// Build a manager with an explicit initial belief.
    pub fn with_state(
        power: Arc<PowerService<P>>,
        hours: OperatingHours,
        interval: Duration,
        online: bool,
    ) -> Self {
        Self {
            power,
            hours,
            interval,
            online,
        }
    }

    /// Whether the manager believes the host is on.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Reconcile once at instant `at`.
    ///
    /// The belief flips even when the procedure reports an error, so a host
    /// that fails to wake is not retried until the window closes and reopens.
    pub async fn step(&mut self, at: Timestamp) -> Option<PowerTransition> {
        let inside = self.hours.contains(at);

        if !self.online && inside {
            if let Err(err) = self.power.turn_on_server_and_vms().await {
                tracing::error!(error = %err, "scheduled power-on failed");
            }
            self.online = true;
            tracing::info!("server started");
            return Some(PowerTransition::PoweredOn);
        }

        if self.online && !inside {
            if let Err(err) = self.power.turn_off_server_and_vms().await {
                tracing::error!(error = %err, "scheduled power-off failed");
            }
            self.online = false;
            tracing::info!("server shutdown");
            return Some(PowerTransition::PoweredOff);
        }

        None
    }

    /// Step every interval until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(
            timezone = %self.hours.timezone(),
            start_hour = self.hours.start_hour(),
            end_hour = self.hours.end_hour(),
            interval = ?self.interval,
            "schedule manager running"
        );

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = self.step(now()) => {}
            }
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("schedule manager stopped");
    }
}
