//! JSON API handler modules.

pub mod power;

use axum::Router;
use axum::routing::get;

use esxi_manager_app::ports::PowerController;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<P>() -> Router<AppState<P>>
where
    P: PowerController + Send + Sync + 'static,
{
    Router::new()
        .route("/isalive", get(power::is_alive::<P>))
        .route("/turnon", get(power::turn_on::<P>))
        .route("/turnoff", get(power::turn_off::<P>))
}
