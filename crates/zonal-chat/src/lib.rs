//! Zonal Chat - Zone-Scoped Realtime Messaging
//!
//! The realtime core: history retrieval, message send, and one live
//! subscription per zone, with per-handle deduplication and race-safe
//! cancellation.
//!
//! # Contracts
//!
//! - At-least-once transport delivery becomes exactly-once handler
//!   invocation, deduplicated by message id within a handle's lifetime.
//! - Cancellation is idempotent and final: once `cancel` returns, the
//!   handler will not be invoked again, even for an event already in
//!   flight.
//! - `subscribe` never fails; a transport that cannot connect yields an
//!   inert, safely cancellable handle.
//! - No optimistic local echo: a sender observes its own message through
//!   the live subscription, not through `send`'s return value being
//!   appended twice.
//!
//! Body validation is re-exported from `zonal-core` so form layers can
//! validate without linking this crate's service.

#![forbid(unsafe_code)]

/// History, send, and count operations
pub mod service;

/// Live subscription handles
pub mod subscription;

pub use service::{MessengerConfig, ZoneMessenger};
pub use subscription::{HandleState, Subscription};
pub use zonal_core::validate::{validate_body, RejectReason, MAX_MESSAGE_CHARS};
