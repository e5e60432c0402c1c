//! The state shown by the status panel and how it changes.
//!
//! The panel owns a single boolean. It starts pessimistic (`false`), takes the
//! server-reported value once the initial liveness query resolves, and is
//! overwritten optimistically whenever a power request settles. Nothing here
//! performs IO: events are produced by the `StatusPanel` driver in the app
//! crate and folded into a [`LivenessState`] by [`LivenessState::apply`].

use serde::{Deserialize, Serialize};

/// Fixed panel heading.
pub const PANEL_TITLE: &str = "ESXi Manager";
/// Label shown in front of the status token.
pub const STATUS_LABEL: &str = "Server Status: ";
/// Caption of the power-on control.
pub const TURN_ON_CAPTION: &str = "Turn On Server";
/// Caption of the power-off control.
pub const TURN_OFF_CAPTION: &str = "Turn Off Server";

/// Whether the managed server is believed to be online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LivenessState {
    /// `true` when the server is believed online.
    pub is_alive: bool,
}

/// Discrete things that can happen to a mounted panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// The liveness query resolved with the server-reported value.
    LoadSucceeded(bool),
    /// The user asked for the server to be powered on.
    TurnOnRequested,
    /// The power-on request settled.
    TurnOnCompleted,
    /// The user asked for the server to be powered off.
    TurnOffRequested,
    /// The power-off request settled.
    TurnOffCompleted,
}

impl LivenessState {
    /// Build a state with an explicit value.
    #[must_use]
    pub const fn new(is_alive: bool) -> Self {
        Self { is_alive }
    }

    /// Fold one event into the state, returning the next state.
    ///
    /// Requests leave the state untouched; only settlement moves it. There
    /// are no guards: completing a power-on while already online yields
    /// online again.
    #[must_use]
    pub const fn apply(self, event: PanelEvent) -> Self {
        match event {
            PanelEvent::LoadSucceeded(is_alive) => Self { is_alive },
            PanelEvent::TurnOnCompleted => Self { is_alive: true },
            PanelEvent::TurnOffCompleted => Self { is_alive: false },
            PanelEvent::TurnOnRequested | PanelEvent::TurnOffRequested => self,
        }
    }

    /// Render this state into a view.
    #[must_use]
    pub fn render(&self) -> PanelView {
        render(self)
    }
}

/// Color of the status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Red,
}

impl StatusColor {
    /// CSS color keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

impl std::fmt::Display for StatusColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_css())
    }
}

/// Everything a front-end needs to draw the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub title: &'static str,
    pub status_label: &'static str,
    pub status_text: &'static str,
    pub status_color: StatusColor,
    pub turn_on_caption: &'static str,
    pub turn_off_caption: &'static str,
}

/// Derive the view purely from the state.
#[must_use]
pub fn render(state: &LivenessState) -> PanelView {
    let (status_text, status_color) = if state.is_alive {
        ("Online", StatusColor::Green)
    } else {
        ("Offline", StatusColor::Red)
    };

    PanelView {
        title: PANEL_TITLE,
        status_label: STATUS_LABEL,
        status_text,
        status_color,
        turn_on_caption: TURN_ON_CAPTION,
        turn_off_caption: TURN_OFF_CAPTION,
    }
}

impl std::fmt::Display for PanelView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "{}{} ({})",
            self.status_label, self.status_text, self.status_color
        )?;
        write!(f, "[{}] [{}]", self.turn_on_caption, self.turn_off_caption)
    }
}
