//! Message types: drafts, persisted rows, and hydrated messages.
//!
//! A [`MessageDraft`] is what a caller submits; the store acknowledges it as
//! a [`MessageRow`] carrying the server-assigned id and timestamp. A
//! [`ZoneMessage`] is a row hydrated with the author's display fields for
//! rendering. Messages are immutable once created.

use crate::identifiers::{MessageId, UserId, Zone};
use crate::principal::{Profile, Role};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Outbound message payload, before the store has assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    /// Partition key the message belongs to
    pub zone: Zone,
    /// Author submitting the message
    pub author_id: UserId,
    /// Validated body text
    pub body: String,
}

/// Persisted message row, exactly as the store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRow {
    /// Server-assigned, unique, never reused
    pub id: MessageId,
    /// Partition key
    pub zone: Zone,
    /// Author of the message
    pub author_id: UserId,
    /// Body text
    pub body: String,
    /// Server timestamp - the authoritative ordering key
    pub created_at: Timestamp,
}

/// A message hydrated with author display fields, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMessage {
    /// Server-assigned message id
    pub id: MessageId,
    /// Partition key
    pub zone: Zone,
    /// Author of the message
    pub author_id: UserId,
    /// Display name resolved from the author's profile, or a truncated-id
    /// fallback when the profile could not be fetched
    pub author_display_name: String,
    /// Author's role at hydration time
    pub author_role: Role,
    /// Body text
    pub body: String,
    /// Server timestamp
    pub created_at: Timestamp,
}

impl ZoneMessage {
    /// Hydrate a persisted row with the author's profile fields.
    ///
    /// A missing profile does not drop the message; the display name falls
    /// back to a truncated author id and the role to [`Role::Public`].
    pub fn hydrate(row: MessageRow, profile: Option<&Profile>) -> Self {
        let (author_display_name, author_role) = match profile {
            Some(p) => (
                p.display_name.clone().unwrap_or_else(|| p.email.clone()),
                p.role,
            ),
            None => (fallback_display_name(&row.author_id), Role::Public),
        };
        Self {
            id: row.id,
            zone: row.zone,
            author_id: row.author_id,
            author_display_name,
            author_role,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// Short display form of an author id, for rows whose profile is gone.
fn fallback_display_name(author_id: &UserId) -> String {
    let id_str = author_id.to_string();
    let short = &id_str[..12.min(id_str.len())];
    format!("{}...", short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row() -> MessageRow {
        MessageRow {
            id: MessageId::from_uuid(Uuid::from_u128(1)),
            zone: Zone::new("Kano"),
            author_id: UserId::from_uuid(Uuid::from_u128(2)),
            body: "hello".into(),
            created_at: Timestamp::from_millis(10),
        }
    }

    #[test]
    fn hydration_prefers_profile_display_name() {
        let profile = Profile {
            user_id: UserId::from_uuid(Uuid::from_u128(2)),
            email: "k@example.org".into(),
            display_name: Some("Kano Staff".into()),
            role: Role::Staff,
            zone: Some(Zone::new("Kano")),
        };
        let msg = ZoneMessage::hydrate(row(), Some(&profile));
        assert_eq!(msg.author_display_name, "Kano Staff");
        assert_eq!(msg.author_role, Role::Staff);
    }

    #[test]
    fn hydration_without_profile_uses_truncated_id() {
        let msg = ZoneMessage::hydrate(row(), None);
        assert!(msg.author_display_name.ends_with("..."));
        assert_eq!(msg.author_role, Role::Public);
        assert_eq!(msg.body, "hello");
    }
}
