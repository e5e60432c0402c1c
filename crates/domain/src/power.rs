//! Power values — host commands and the outcome of schedule steps.

use std::fmt;

const ALL_VMS: &str = "$(vim-cmd vmsvc/getallvms | awk 'NR>1{print $1}')";

/// A shell command understood by an ESXi host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Cheap probe used to decide reachability.
    Version,
    /// Power the host off.
    PowerOff,
    /// Enter (`true`) or leave (`false`) maintenance mode.
    SetMaintenanceMode(bool),
    /// Power on every registered VM.
    BootAllVms,
    /// Power off every registered VM.
    ShutDownAllVms,
    /// Start one VM by world id.
    StartVm(String),
}

impl HostCommand {
    /// The exact command line sent over SSH.
    #[must_use]
    pub fn command_line(&self) -> String {
        match self {
            Self::Version => "esxcli --version".to_string(),
            Self::PowerOff => {
                "esxcli system shutdown poweroff --reason 'routine shutdown'".to_string()
            }
            Self::SetMaintenanceMode(enable) => {
                format!("esxcli system maintenanceMode set --enable {enable}")
            }
            Self::BootAllVms => {
                format!("for vmid in {ALL_VMS}; do vim-cmd vmsvc/power.on $vmid; done")
            }
            Self::ShutDownAllVms => {
                format!("for vmid in {ALL_VMS}; do vim-cmd vmsvc/power.off $vmid; done")
            }
            Self::StartVm(id) => format!("esxcli vm process start --type={id}"),
        }
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// What a schedule step did to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    PoweredOn,
    PoweredOff,
}
