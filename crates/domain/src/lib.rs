//! # esxi-manager-domain
//!
//! Pure domain model for the ESXi manager.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define the **liveness panel** state, its events and its rendered view
//! - Define **power** values: MAC addresses, Wake-on-LAN magic packets and
//!   power transitions
//! - Define **operating hours** and evaluate them in a given timezone
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod liveness;
pub mod mac;
pub mod power;
pub mod schedule;
