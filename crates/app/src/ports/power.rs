//! Power port — how the application reaches the managed host.

use std::future::Future;

use esxi_manager_domain::error::ManagerError;
use esxi_manager_domain::power::HostCommand;

/// Drives the physical host.
///
/// Implementations live in adapter crates (e.g. `adapter_ssh`).
pub trait PowerController {
    /// Send the out-of-band wake signal (Wake-on-LAN).
    fn wake(&self) -> impl Future<Output = Result<(), ManagerError>> + Send;

    /// Run one command on the host, failing if it cannot be delivered or
    /// exits non-zero.
    fn run(&self, command: HostCommand) -> impl Future<Output = Result<(), ManagerError>> + Send;
}

impl<T: PowerController + Send + Sync> PowerController for std::sync::Arc<T> {
    fn wake(&self) -> impl Future<Output = Result<(), ManagerError>> + Send {
        (**self).wake()
    }

    fn run(&self, command: HostCommand) -> impl Future<Output = Result<(), ManagerError>> + Send {
        (**self).run(command)
    }
}
