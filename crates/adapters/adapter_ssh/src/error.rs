//! SSH adapter error types.

use esxi_manager_domain::error::{CommandError, ManagerError};

/// Errors specific to the SSH / Wake-on-LAN adapter.
#[derive(Debug, thiserror::Error)]
pub enum SshError {
    /// The host name did not resolve to any address.
    #[error("could not resolve {0}")]
    Resolve(String),

    /// TCP connect or socket IO failed.
    #[error("network IO failed")]
    Io(#[from] std::io::Error),

    /// The SSH session failed (handshake, auth, channel).
    #[error("SSH session error")]
    Session(#[from] ssh2::Error),

    /// The command ran and exited non-zero.
    #[error(transparent)]
    Command(CommandError),

    /// Fewer bytes than a full magic packet left the socket.
    #[error("magic packet truncated: sent {0} bytes")]
    ShortWrite(usize),

    /// The blocking worker panicked or was cancelled.
    #[error("blocking task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl SshError {
    /// Convert into a [`ManagerError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> ManagerError {
        match self {
            Self::Command(err) => ManagerError::Command(err),
            other => ManagerError::transport(other),
        }
    }
}

impl From<SshError> for ManagerError {
    fn from(err: SshError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_command_failure_to_command_error() {
        let err: ManagerError = SshError::Command(CommandError {
            command: "esxcli --version".to_string(),
            status: 127,
        })
        .into();
        assert!(matches!(err, ManagerError::Command(CommandError { status: 127, .. })));
    }

    #[test]
    fn should_convert_io_failure_to_transport_error() {
        let io = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        let err: ManagerError = SshError::Io(io).into();
        assert!(matches!(err, ManagerError::Transport(_)));
    }

    #[test]
    fn should_display_resolve_error() {
        let err = SshError::Resolve("esxi.invalid:22".to_string());
        assert_eq!(err.to_string(), "could not resolve esxi.invalid:22");
    }
}
