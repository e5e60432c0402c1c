//! # esxi-manager-adapter-ssh
//!
//! Drives a physical ESXi host.
//!
//! ## Responsibilities
//! - Wake the host with a Wake-on-LAN magic packet over UDP
//! - Run `esxcli` / `vim-cmd` commands over password-authenticated SSH
//! - Implement the [`PowerController`] port on top of both
//!
//! `ssh2` is blocking, so every command runs on tokio's blocking pool.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `esxi-manager-app` and
//! `esxi-manager-domain`.

pub mod config;
pub mod error;
pub mod ssh;
pub mod wol;

use std::net::SocketAddr;

use esxi_manager_app::ports::PowerController;
use esxi_manager_domain::error::{ManagerError, ValidationError};
use esxi_manager_domain::mac::MacAddress;
use esxi_manager_domain::power::HostCommand;

use crate::config::{SshConfig, WolConfig};
use crate::ssh::SshClient;

/// [`PowerController`] for an ESXi host reachable over SSH.
#[derive(Debug, Clone)]
pub struct SshPowerController {
    client: SshClient,
    mac: MacAddress,
    broadcast: SocketAddr,
}

impl SshPowerController {
    /// Build a controller from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMacAddress`] if the configured MAC
    /// address does not parse.
    pub fn new(ssh: &SshConfig, wol: &WolConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            client: SshClient::new(ssh),
            mac: ssh.mac_address.parse()?,
            broadcast: wol.broadcast_addr,
        })
    }

    /// Hardware address woken by [`PowerController::wake`].
    #[must_use]
    pub fn mac(&self) -> MacAddress {
        self.mac
    }
}

impl PowerController for SshPowerController {
    fn wake(&self) -> impl Future<Output = Result<(), ManagerError>> + Send {
        let mac = self.mac;
        let broadcast = self.broadcast;
        async move {
            wol::send_magic_packet(mac, broadcast)
                .await
                .map_err(ManagerError::from)
        }
    }

    fn run(&self, command: HostCommand) -> impl Future<Output = Result<(), ManagerError>> + Send {
        let client = self.client.clone();
        async move {
            let line = command.command_line();
            tokio::task::spawn_blocking(move || client.exec(&line))
                .await
                .map_err(|err| ManagerError::from(error::SshError::from(err)))?
                .map(drop)
                .map_err(ManagerError::from)
        }
    }
}
