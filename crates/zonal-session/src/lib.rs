//! Zonal Session - Identity Resolution and Routing
//!
//! This crate owns the authenticated-session state machine. It resolves raw
//! credential events from the external identity provider into a trusted
//! [`Principal`](zonal_core::Principal), publishes it through the
//! [`IdentityStore`], and decides which UI area the current principal
//! belongs in.
//!
//! The session state machine is `Unresolved -> Resolving ->
//! Resolved(Authenticated | Unauthenticated)`. "Resolving" is the in-flight
//! future of an operation; the store only ever holds terminal snapshots, so
//! readers can never observe a partially resolved identity.
//!
//! The [`IdentityStore`] is the single piece of process-wide shared state:
//! written exclusively by the [`SessionController`], read by everyone else.

#![forbid(unsafe_code)]

/// Injectable, watch-backed principal container
pub mod store;

/// The session controller state machine
pub mod controller;

/// Route areas and the idempotent navigation guard
pub mod guard;

pub use controller::SessionController;
pub use guard::{required_area, NavigationGuard, RouteArea};
pub use store::IdentityStore;
