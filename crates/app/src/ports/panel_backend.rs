//! Panel backend port — the three endpoints the status panel talks to.

use std::future::Future;

use esxi_manager_domain::error::ManagerError;

/// Backend consumed by [`StatusPanel`](crate::panel::StatusPanel).
///
/// `turn_on` / `turn_off` resolve `Ok` as soon as the request settles with
/// any response; only a transport failure is an `Err`.
pub trait PanelBackend {
    /// `GET /api/isalive`, returning the reported `is_alive` field.
    fn is_alive(&self) -> impl Future<Output = Result<bool, ManagerError>> + Send;

    /// `GET /api/turnon`.
    fn turn_on(&self) -> impl Future<Output = Result<(), ManagerError>> + Send;

    /// `GET /api/turnoff`.
    fn turn_off(&self) -> impl Future<Output = Result<(), ManagerError>> + Send;
}
