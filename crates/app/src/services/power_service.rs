//! Power service — full power-on and power-off procedures for the host.

use std::time::Duration;

use esxi_manager_domain::error::ManagerError;
use esxi_manager_domain::power::HostCommand;

use crate::ports::PowerController;

/// Timing knobs for the power procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerPolicy {
    /// How many reachability checks to make after a power command. Zero
    /// skips verification entirely; the daemon's config rejects it.
    pub retry_count: u32,
    /// Pause between two reachability checks.
    pub retry_delay: Duration,
    /// Pause between asking VMs to stop and powering the host off.
    pub vm_shutdown_grace: Duration,
}

impl Default for PowerPolicy {
    fn default() -> Self {
        Self {
            retry_count: 5,
            retry_delay: Duration::from_secs(30),
            vm_shutdown_grace: Duration::from_secs(60),
        }
    }
}

/// Application service sequencing power procedures on one host.
pub struct PowerService<P> {
    controller: P,
    policy: PowerPolicy,
}

impl<P: PowerController> PowerService<P> {
    /// Create a new service backed by the given controller.
    pub fn new(controller: P, policy: PowerPolicy) -> Self {
        Self { controller, policy }
    }

    /// The underlying controller.
    pub fn controller(&self) -> &P {
        &self.controller
    }

    /// The timing policy in use.
    pub fn policy(&self) -> PowerPolicy {
        self.policy
    }

    /// Whether the host answers a probe command. Any failure counts as
    /// unreachable.
    pub async fn is_reachable(&self) -> bool {
        match self.controller.run(HostCommand::Version).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "error determining if server was reachable");
                false
            }
        }
    }

    /// Enter or leave maintenance mode.
    ///
    /// # Errors
    ///
    /// Propagates the controller error.
    pub async fn set_maintenance_mode(&self, enable: bool) -> Result<(), ManagerError> {
        tracing::info!(enable, "setting maintenance mode");
        self.controller
            .run(HostCommand::SetMaintenanceMode(enable))
            .await
            .inspect_err(|err| {
                tracing::error!(enable, error = %err, "failed to set maintenance mode");
            })
    }

    /// Start the given VMs one by one, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the first VM that failed to start.
    pub async fn boot_vms<I, S>(&self, vm_ids: I) -> Result<(), ManagerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for vm_id in vm_ids {
            let vm_id = vm_id.into();
            if let Err(err) = self.controller.run(HostCommand::StartVm(vm_id.clone())).await {
                tracing::error!(vm_id, error = %err, "failed to boot VM");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Power on every VM registered on the host.
    ///
    /// # Errors
    ///
    /// Propagates the controller error.
    pub async fn boot_all_vms(&self) -> Result<(), ManagerError> {
        tracing::info!("attempting to boot all VMs");
        self.controller.run(HostCommand::BootAllVms).await
    }

    /// Power off every VM registered on the host.
    ///
    /// # Errors
    ///
    /// Propagates the controller error.
    pub async fn shut_down_all_vms(&self) -> Result<(), ManagerError> {
        tracing::info!("attempting to shut down all VMs");
        self.controller.run(HostCommand::ShutDownAllVms).await
    }

    /// Wake the host, wait for it to come up, leave maintenance mode and boot
    /// every VM.
    ///
    /// Verification is best effort: the VM steps run even if the host never
    /// answered, and their failures are only logged.
    ///
    /// # Errors
    ///
    /// Returns the wake error; nothing else is attempted in that case.
    pub async fn turn_on_server_and_vms(&self) -> Result<(), ManagerError> {
        tracing::info!("turning server on");

        if let Err(err) = self.controller.wake().await {
            tracing::error!(error = %err, "failed to turn on server");
            return Err(err);
        }

        if self.wait_for_reachability(true).await {
            tracing::info!("server online");
        }

        let _ = self.set_maintenance_mode(false).await;
        if let Err(err) = self.boot_all_vms().await {
            tracing::error!(error = %err, "failed to boot VMs");
        }

        Ok(())
    }

    /// Stop every VM, enter maintenance mode, power the host off and wait
    /// for it to disappear.
    ///
    /// # Errors
    ///
    /// Returns the power-off error; verification is skipped in that case.
    pub async fn turn_off_server_and_vms(&self) -> Result<(), ManagerError> {
        tracing::info!("turning server off");

        if let Err(err) = self.shut_down_all_vms().await {
            tracing::error!(error = %err, "failed to shut down VMs");
        }

        // TODO: poll VM power state instead of sleeping a fixed grace period.
        tokio::time::sleep(self.policy.vm_shutdown_grace).await;

        let _ = self.set_maintenance_mode(true).await;

        if let Err(err) = self.controller.run(HostCommand::PowerOff).await {
            tracing::error!(error = %err, "failed to turn off server");
            return Err(err);
        }

        if self.wait_for_reachability(false).await {
            tracing::info!("server offline");
        }

        Ok(())
    }

    /// Poll until reachability equals `want`, at most `retry_count` times.
    async fn wait_for_reachability(&self, want: bool) -> bool {
        let attempts = self.policy.retry_count;
        for attempt in 1..=attempts {
            if self.is_reachable().await == want {
                return true;
            }
            if attempt == attempts {
                tracing::warn!(
                    retries = attempts,
                    delay = ?self.policy.retry_delay,
                    want_online = want,
                    "server did not reach requested power state"
                );
                break;
            }
            tracing::info!(
                attempt,
                delay = ?self.policy.retry_delay,
                want_online = want,
                "server not in requested power state yet, retrying"
            );
            tokio::time::sleep(self.policy.retry_delay).await;
        }
        false
    }
}
