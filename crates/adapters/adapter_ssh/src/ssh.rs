//! Blocking SSH command execution with `ssh2`.
//!
//! Every command opens a fresh session, runs, and closes. Sessions are cheap
//! compared with the power procedures they serve, and a host that was just
//! powered off would invalidate any cached session anyway.

use std::fmt;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use esxi_manager_domain::error::CommandError;
use ssh2::Session;

use crate::config::SshConfig;
use crate::error::SshError;

/// Password-authenticated SSH client for one host.
#[derive(Clone)]
pub struct SshClient {
    address: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl SshClient {
    /// Build a client from configuration. No connection is made yet.
    #[must_use]
    pub fn new(config: &SshConfig) -> Self {
        Self {
            address: config.address(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.ssh_timeout_secs),
        }
    }

    /// `host:port` this client dials.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Run `command` and return its standard output.
    ///
    /// The connect timeout covers TCP connect, handshake and authentication;
    /// the command itself may run as long as it needs.
    ///
    /// # Errors
    ///
    /// [`SshError::Command`] when the command exits non-zero, any other
    /// variant when the host could not be reached or the session broke.
    pub fn exec(&self, command: &str) -> Result<String, SshError> {
        tracing::debug!(address = %self.address, command, "sending command to server");

        let session = self.connect()?;
        let mut channel = session.channel_session()?;
        channel.exec(command)?;

        let mut raw = Vec::new();
        channel.read_to_end(&mut raw)?;
        let output = decode_output(&raw);
        channel.wait_close()?;
        let status = channel.exit_status()?;

        tracing::debug!(status, output = output.trim_end(), "received message from server");

        if status == 0 {
            Ok(output)
        } else {
            Err(SshError::Command(CommandError {
                command: command.to_string(),
                status,
            }))
        }
    }

    fn connect(&self) -> Result<Session, SshError> {
        let addr = self
            .address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| SshError::Resolve(self.address.clone()))?;
        let tcp = TcpStream::connect_timeout(&addr, self.timeout)?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_millis(self.timeout));
        session.handshake()?;
        session.userauth_password(&self.username, &self.password)?;
        // No timeout for the command itself.
        session.set_timeout(0);
        Ok(session)
    }
}

impl fmt::Debug for SshClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshClient")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Remote output is logged, never parsed, so invalid UTF-8 is replaced.
fn decode_output(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}
