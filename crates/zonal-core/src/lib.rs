//! Zonal Core - Shared Foundation
//!
//! This crate provides the foundational types and collaborator contracts for
//! the Zonal session and messaging core. It contains only pure types, the
//! closed error taxonomy, and effect trait definitions; handlers live in
//! consumer crates (or in `zonal-testkit` for tests).
//!
//! # Architecture Layers
//!
//! ## Domain Types
//! - Identifiers: [`UserId`], [`MessageId`], [`Zone`]
//! - Identity: [`Role`], [`Profile`], [`Principal`]
//! - Messaging: [`MessageDraft`], [`MessageRow`], [`ZoneMessage`]
//! - Time: [`Timestamp`] (server-authoritative, millisecond precision)
//!
//! ## Effect Interfaces (Pure Signatures)
//! - [`effects::CredentialEffects`]: credential restore / password sign-in /
//!   sign-out plus the provider's auth event feed
//! - [`effects::RecordStoreEffects`]: profile lookup, zone-partitioned
//!   message reads/writes, and the insert subscription feed
//!
//! ## Error Handling
//! - [`ZonalError`]: the closed taxonomy every operation resolves to.
//!   Collaborator errors ([`effects::AuthError`], [`effects::StoreError`])
//!   are normalized into it at the session/messaging boundary.

#![forbid(unsafe_code)]

/// Newtype identifiers for users, messages, and zones
pub mod identifiers;

/// Principal, profile, and role types
pub mod principal;

/// Message rows, drafts, and hydrated messages
pub mod message;

/// Unified error handling
pub mod errors;

/// Server-authoritative timestamps
pub mod time;

/// Outbound message body validation
pub mod validate;

/// Pure effect interfaces (no implementations)
pub mod effects;

pub use errors::{Result, ZonalError};
pub use identifiers::{MessageId, UserId, Zone};
pub use message::{MessageDraft, MessageRow, ZoneMessage};
pub use principal::{Principal, Profile, Role};
pub use time::Timestamp;
pub use validate::{validate_body, RejectReason, MAX_MESSAGE_CHARS};
