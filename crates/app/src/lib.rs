//! # esxi-manager-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `PowerController` — wake the host and run commands on it
//!   - `PanelBackend` — the three HTTP endpoints as seen by the status panel
//! - Define **driving/inbound** use-cases:
//!   - `PowerService` — full power-on / power-off procedures with verification
//!   - `ScheduleManager` — keep the host on only during operating hours
//!   - `StatusPanel` — event-driven liveness panel
//! - Orchestrate domain objects without knowing *how* SSH, UDP or HTTP work
//!
//! ## Dependency rule
//! Depends on `esxi-manager-domain` only (plus `tokio` for tasks, channels
//! and timers). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod panel;
pub mod ports;
pub mod services;
