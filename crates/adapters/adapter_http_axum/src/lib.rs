//! # esxi-manager-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **power API** consumed by the status panel
//!   (`/api/isalive`, `/api/turnon`, `/api/turnoff`)
//! - Serve the **status panel page** at `/`, rendered server-side from the
//!   default liveness state and hydrated by a small inline script
//! - Map HTTP requests into `PowerService` calls (driving adapter)
//!
//! ## Fire-and-forget power requests
//! `turnon` and `turnoff` answer `200` straight away and run the (slow)
//! procedure on a detached task. Callers learn nothing about the outcome; the
//! panel updates optimistically and the logs carry the details.
//!
//! ## Dependency rule
//! Depends on `esxi-manager-app` (for port traits and services) and
//! `esxi-manager-domain` (for the liveness types). Never leaks axum types
//! into the domain.

pub mod api;
pub mod dashboard;
pub mod router;
pub mod state;
