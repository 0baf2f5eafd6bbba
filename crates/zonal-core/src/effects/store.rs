//! Record store effect trait.
//!
//! Generic keyed-table access: profiles by id, messages by zone. The core
//! assumes nothing about the wire protocol beyond the contracts documented
//! on each method - ordered reads, writes that return the persisted row,
//! and insert subscriptions that deliver new rows at-least-once.

use crate::identifiers::{UserId, Zone};
use crate::message::{MessageDraft, MessageRow};
use crate::principal::Profile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Error type for record store operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StoreError {
    /// Store unreachable (offline, timeout at the transport layer)
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Underlying transport detail
        message: String,
    },
    /// The store rejected or failed the query
    #[error("Query failed: {message}")]
    Query {
        /// Underlying query detail
        message: String,
    },
    /// The realtime channel could not be established
    #[error("Channel error: {message}")]
    Channel {
        /// Underlying channel detail
        message: String,
    },
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a channel error
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }
}

/// Contract for the external record store.
#[async_trait]
pub trait RecordStoreEffects: Send + Sync {
    /// Fetch one profile by user id. `Ok(None)` when no row exists.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError>;

    /// Insert a profile row at registration time.
    async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError>;

    /// Fetch all messages for a zone, ordered ascending by `created_at`.
    /// An empty zone yields an empty vec, not an error.
    async fn messages_by_zone(&self, zone: &Zone) -> Result<Vec<MessageRow>, StoreError>;

    /// Persist a draft. The returned row carries the server-assigned id and
    /// timestamp, and will subsequently be observed by every live insert
    /// subscription for the draft's zone - including the sender's own.
    async fn insert_message(&self, draft: MessageDraft) -> Result<MessageRow, StoreError>;

    /// Count messages in a zone.
    async fn count_messages(&self, zone: &Zone) -> Result<u64, StoreError>;

    /// Open a feed of newly inserted rows matching the zone filter.
    /// Delivery is at-least-once; duplicates are the subscriber's problem
    /// (the messaging layer deduplicates by row id).
    async fn subscribe_inserts(
        &self,
        zone: &Zone,
    ) -> Result<broadcast::Receiver<MessageRow>, StoreError>;
}
