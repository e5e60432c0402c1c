//! Power endpoints consumed by the status panel.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use esxi_manager_app::ports::PowerController;
use esxi_manager_domain::liveness::LivenessState;

use crate::state::AppState;

/// Possible responses from the liveness endpoint.
pub enum IsAliveResponse {
    Ok(Json<LivenessState>),
}

impl IntoResponse for IsAliveResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the power endpoints.
pub enum PowerResponse {
    /// The procedure was started in the background.
    Started,
}

impl IntoResponse for PowerResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Started => StatusCode::OK.into_response(),
        }
    }
}

/// `GET /api/isalive`
pub async fn is_alive<P>(State(state): State<AppState<P>>) -> IsAliveResponse
where
    P: PowerController + Send + Sync + 'static,
{
    let is_alive = state.power_service.is_reachable().await;
    IsAliveResponse::Ok(Json(LivenessState::new(is_alive)))
}

/// `GET /api/turnon`
pub async fn turn_on<P>(State(state): State<AppState<P>>) -> PowerResponse
where
    P: PowerController + Send + Sync + 'static,
{
    let power = state.power_service;
    tokio::spawn(async move {
        if let Err(err) = power.turn_on_server_and_vms().await {
            tracing::error!(error = %err, "requested power-on failed");
        }
    });
    PowerResponse::Started
}

/// `GET /api/turnoff`
pub async fn turn_off<P>(State(state): State<AppState<P>>) -> PowerResponse
where
    P: PowerController + Send + Sync + 'static,
{
    let power = state.power_service;
    tokio::spawn(async move {
        if let Err(err) = power.turn_off_server_and_vms().await {
            tracing::error!(error = %err, "requested power-off failed");
        }
    });
    PowerResponse::Started
}
