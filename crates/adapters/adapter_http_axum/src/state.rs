//! Shared application state for axum handlers.

use std::sync::Arc;

use esxi_manager_app::ports::PowerController;
use esxi_manager_app::services::power_service::PowerService;

/// Application state shared across all axum handlers.
///
/// Generic over the power controller to avoid dynamic dispatch.
/// `Clone` is implemented manually so the controller itself does not need to
/// be `Clone`; only the `Arc` wrapper is cloned.
pub struct AppState<P> {
    /// Power procedures for the managed host.
    pub power_service: Arc<PowerService<P>>,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            power_service: Arc::clone(&self.power_service),
        }
    }
}

impl<P> AppState<P>
where
    P: PowerController + Send + Sync + 'static,
{
    /// Create a new application state from a service instance.
    pub fn new(power_service: PowerService<P>) -> Self {
        Self::from_arc(Arc::new(power_service))
    }

    /// Create a new application state from a pre-wrapped service.
    ///
    /// Use this when the service is shared with background tasks such as
    /// the schedule manager.
    pub fn from_arc(power_service: Arc<PowerService<P>>) -> Self {
        Self { power_service }
    }
}
