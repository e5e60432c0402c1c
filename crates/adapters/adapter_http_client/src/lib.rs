//! # esxi-manager-adapter-http-client
//!
//! [`PanelBackend`] over HTTP, built on [reqwest](https://docs.rs/reqwest).
//!
//! Mirrors what a browser `fetch` would do for the status panel: no request
//! bodies, headers or query parameters; the liveness body is parsed as JSON;
//! power responses count as settled whatever their status code or body.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `esxi-manager-app` and
//! `esxi-manager-domain`.

use esxi_manager_app::ports::PanelBackend;
use esxi_manager_domain::error::ManagerError;
use esxi_manager_domain::liveness::LivenessState;

/// Errors specific to the HTTP client adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The request could not be sent or its body could not be decoded.
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<HttpClientError> for ManagerError {
    fn from(err: HttpClientError) -> Self {
        ManagerError::transport(err)
    }
}

/// Talks to the `/api` endpoints of one daemon.
#[derive(Debug, Clone)]
pub struct HttpPanelBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPanelBackend {
    /// Create a backend for the daemon at `base_url` (e.g.
    /// `http://localhost:8080`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Root URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch(&self, path: &str) -> Result<reqwest::Response, HttpClientError> {
        let url = self.url(path);
        tracing::debug!(url, "GET");
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|source| HttpClientError::Request { url, source })
    }
}

impl PanelBackend for HttpPanelBackend {
    fn is_alive(&self) -> impl Future<Output = Result<bool, ManagerError>> + Send {
        async move {
            let response = self.fetch("/api/isalive").await?;
            let url = response.url().to_string();
            let state: LivenessState = response
                .json()
                .await
                .map_err(|source| HttpClientError::Request { url, source })?;
            Ok(state.is_alive)
        }
    }

    fn turn_on(&self) -> impl Future<Output = Result<(), ManagerError>> + Send {
        async move {
            let response = self.fetch("/api/turnon").await?;
            tracing::debug!(status = %response.status(), "turn-on settled");
            Ok(())
        }
    }

    fn turn_off(&self) -> impl Future<Output = Result<(), ManagerError>> + Send {
        async move {
            let response = self.fetch("/api/turnoff").await?;
            tracing::debug!(status = %response.status(), "turn-off settled");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use esxi_manager_app::panel::StatusPanel;
    use esxi_manager_domain::liveness::StatusColor;

    use super::*;

    /// Serve a fake daemon on an ephemeral port, returning its base URL and
    /// the number of liveness requests it has seen.
    async fn serve(is_alive: bool) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new()
            .route(
                "/api/isalive",
                get(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move { axum::Json(serde_json::json!({ "is_alive": is_alive })) }
                }),
            )
            .route(
                "/api/turnon",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/api/turnoff", get(|| async { "whatever" }))
            .route("/broken/api/isalive", get(|| async { "not json" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), hits)
    }

    fn closed_port_url() -> String {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        format!("http://127.0.0.1:{port}")
    }

    #[test]
    fn should_trim_trailing_slash_from_base_url() {
        let backend = HttpPanelBackend::new("http://esxi-manager:8080/");
        assert_eq!(backend.base_url(), "http://esxi-manager:8080");
        assert_eq!(backend.url("/api/isalive"), "http://esxi-manager:8080/api/isalive");
    }

    #[tokio::test]
    async fn should_read_is_alive_field() {
        let (url, hits) = serve(true).await;
        let backend = HttpPanelBackend::new(url);

        assert!(backend.is_alive().await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_fail_when_liveness_body_is_not_json() {
        let (url, _) = serve(true).await;
        let backend = HttpPanelBackend::new(format!("{url}/broken"));

        let err = backend.is_alive().await.unwrap_err();

        assert!(matches!(err, ManagerError::Transport(_)));
    }

    #[tokio::test]
    async fn should_settle_turn_on_despite_server_error() {
        let (url, _) = serve(false).await;
        assert!(HttpPanelBackend::new(url).turn_on().await.is_ok());
    }

    #[tokio::test]
    async fn should_settle_turn_off_ignoring_body() {
        let (url, _) = serve(true).await;
        assert!(HttpPanelBackend::new(url).turn_off().await.is_ok());
    }

    #[tokio::test]
    async fn should_fail_turn_on_when_daemon_is_unreachable() {
        let backend = HttpPanelBackend::new(closed_port_url());
        let err = backend.turn_on().await.unwrap_err();
        assert!(matches!(err, ManagerError::Transport(_)));
    }

    #[tokio::test]
    async fn should_drive_status_panel_against_live_server() {
        let (url, hits) = serve(true).await;
        let mut panel = StatusPanel::new(HttpPanelBackend::new(url));

        assert_eq!(panel.mount().status_text, "Offline");
        let view = tokio::time::timeout(Duration::from_secs(5), panel.next_view())
            .await
            .unwrap();
        assert_eq!(view.status_text, "Online");
        assert_eq!(view.status_color, StatusColor::Green);

        panel.turn_off();
        let view = tokio::time::timeout(Duration::from_secs(5), panel.next_view())
            .await
            .unwrap();
        assert_eq!(view.status_text, "Offline");

        panel.turn_on();
        let view = tokio::time::timeout(Duration::from_secs(5), panel.next_view())
            .await
            .unwrap();
        assert_eq!(view.status_text, "Online");

        panel.mount();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
