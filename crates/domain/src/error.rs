//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ManagerError`] at port boundaries.

use std::error::Error as StdError;

/// Base error for every fallible operation that crosses a port.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// A value failed domain validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A remote command ran but reported failure.
    #[error("remote command failed")]
    Command(#[from] CommandError),

    /// The remote host or backend could not be reached.
    #[error("transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

/// Domain validation failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a 6-octet MAC address.
    #[error("invalid MAC address: {0:?}")]
    InvalidMacAddress(String),

    /// An hour outside `0..=23`, or an empty operating window.
    #[error("invalid operating hour: {0}")]
    InvalidHour(u32),

    /// An unknown IANA timezone name.
    #[error("unknown timezone: {0:?}")]
    InvalidTimezone(String),
}

/// A remote command that exited with a non-zero status.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("command {command:?} exited with status {status}")]
pub struct CommandError {
    /// The command line sent to the host.
    pub command: String,
    /// Remote exit status.
    pub status: i32,
}

impl ManagerError {
    /// Wrap any transport-level failure.
    pub fn transport(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}
