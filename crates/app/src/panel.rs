//! Status panel — drives a [`LivenessState`] from backend requests.
//!
//! The panel is a single-owner event loop. Every backend request runs as its
//! own tokio task and reports back through an unbounded channel; the owner
//! folds events into the state in the order they arrive, so when requests
//! overlap the one that settles last wins. Requests are never cancelled.
//!
//! Failures are deliberately quiet: a liveness query that fails leaves the
//! state where it was, and a power request that never gets a response
//! produces no completion event. Both are only visible in the logs.

use std::sync::Arc;

use esxi_manager_domain::liveness::{LivenessState, PanelEvent, PanelView};
use tokio::sync::mpsc;

use crate::ports::PanelBackend;

/// A mounted (or mountable) status panel.
pub struct StatusPanel<B> {
    backend: Arc<B>,
    state: LivenessState,
    mounted: bool,
    events_tx: mpsc::UnboundedSender<PanelEvent>,
    events_rx: mpsc::UnboundedReceiver<PanelEvent>,
}

impl<B> StatusPanel<B>
where
    B: PanelBackend + Send + Sync + 'static,
{
    /// Create an unmounted panel in the pessimistic default state.
    pub fn new(backend: B) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend: Arc::new(backend),
            state: LivenessState::default(),
            mounted: false,
            events_tx,
            events_rx,
        }
    }

    /// Current state.
    pub fn state(&self) -> LivenessState {
        self.state
    }

    /// Render the current state.
    pub fn view(&self) -> PanelView {
        self.state.render()
    }

    /// Issue the one liveness query of this panel's lifetime and return the
    /// view to show until it resolves. Later calls only re-render.
    pub fn mount(&mut self) -> PanelView {
        if !self.mounted {
            self.mounted = true;
            let backend = Arc::clone(&self.backend);
            let events = self.events_tx.clone();
            tokio::spawn(async move {
                match backend.is_alive().await {
                    Ok(is_alive) => {
                        let _ = events.send(PanelEvent::LoadSucceeded(is_alive));
                    }
                    Err(err) => tracing::debug!(error = %err, "liveness query failed"),
                }
            });
        }
        self.view()
    }

    /// Ask the backend to power the server on.
    pub fn turn_on(&mut self) {
        self.dispatch(PanelEvent::TurnOnRequested);
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            match backend.turn_on().await {
                Ok(()) => {
                    let _ = events.send(PanelEvent::TurnOnCompleted);
                }
                Err(err) => tracing::debug!(error = %err, "turn-on request failed"),
            }
        });
    }

    /// Ask the backend to power the server off.
    pub fn turn_off(&mut self) {
        self.dispatch(PanelEvent::TurnOffRequested);
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            match backend.turn_off().await {
                Ok(()) => {
                    let _ = events.send(PanelEvent::TurnOffCompleted);
                }
                Err(err) => tracing::debug!(error = %err, "turn-off request failed"),
            }
        });
    }

    /// Wait for the next settled request, apply it and return the new view.
    ///
    /// Pending forever when nothing is outstanding; callers race it against
    /// their own input.
    pub async fn next_view(&mut self) -> PanelView {
        // The panel holds a sender itself, so the channel never closes.
        if let Some(event) = self.events_rx.recv().await {
            self.dispatch(event);
        }
        self.view()
    }

    fn dispatch(&mut self, event: PanelEvent) {
        let next = self.state.apply(event);
        tracing::trace!(?event, from = self.state.is_alive, to = next.is_alive, "panel event");
        self.state = next;
    }
}
