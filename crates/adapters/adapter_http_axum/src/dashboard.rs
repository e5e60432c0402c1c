//! Status panel page.

use askama::Template;
use axum::Router;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;

use esxi_manager_app::ports::PowerController;
use esxi_manager_domain::liveness::{LivenessState, PanelView, render};

use crate::state::AppState;

/// Status panel template.
///
/// The markup is the view of the default (offline) state; the inline script
/// then runs the same mount / click contract in the browser, swapping the
/// status token between the two pre-rendered variants.
#[derive(Template)]
#[template(path = "panel.html")]
pub struct PanelTemplate {
    view: PanelView,
    online: PanelView,
    offline: PanelView,
}

impl PanelTemplate {
    /// Template for a freshly mounted panel.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            view: LivenessState::default().render(),
            online: render(&LivenessState::new(true)),
            offline: render(&LivenessState::new(false)),
        }
    }
}

impl IntoResponse for PanelTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// Build the dashboard sub-router.
pub fn routes<P>() -> Router<AppState<P>>
where
    P: PowerController + Send + Sync + 'static,
{
    Router::new().route("/", get(index))
}

/// `GET /` — the status panel.
pub async fn index() -> PanelTemplate {
    PanelTemplate::initial()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_offline_in_red_initially() {
        let html = PanelTemplate::initial().to_string();
        assert!(html.contains(r#"<span id="status" style="color: red">Offline</span>"#));
    }

    #[test]
    fn should_render_both_controls() {
        let html = PanelTemplate::initial().to_string();
        assert!(html.contains(">Turn On Server</button>"));
        assert!(html.contains(">Turn Off Server</button>"));
    }

    #[test]
    fn should_query_liveness_endpoint_from_script() {
        let html = PanelTemplate::initial().to_string();
        assert_eq!(html.matches(r#"fetch("/api/isalive")"#).count(), 1);
        assert!(html.contains(r#"fetch("/api/turnon")"#));
        assert!(html.contains(r#"fetch("/api/turnoff")"#));
    }
}
