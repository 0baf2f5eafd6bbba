//! The zone messenger: history, send, count, subscribe.
//!
//! One shared instance owns all in-flight subscriptions in practice,
//! because the backing transport multiplexes one logical channel per zone
//! name; tests construct fresh isolated instances freely.

use crate::subscription::Subscription;
use std::collections::HashMap;
use std::sync::Arc;
use zonal_core::effects::RecordStoreEffects;
use zonal_core::{
    validate_body, MessageDraft, MessageRow, Profile, Result, UserId, Zone, ZonalError,
    ZoneMessage,
};

/// Tuning knobs for the messenger.
#[derive(Debug, Clone, Default)]
pub struct MessengerConfig {
    /// Cap on rows returned by `history`; `None` returns the full zone.
    pub history_limit: Option<usize>,
}

/// History retrieval, message send, and live subscriptions for zones.
pub struct ZoneMessenger<S> {
    store: Arc<S>,
    config: MessengerConfig,
}

impl<S> ZoneMessenger<S>
where
    S: RecordStoreEffects + 'static,
{
    /// Create a messenger with default configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, MessengerConfig::default())
    }

    /// Create a messenger with explicit configuration.
    pub fn with_config(store: Arc<S>, config: MessengerConfig) -> Self {
        Self { store, config }
    }

    /// Fetch a zone's messages, hydrated, ascending by `created_at`
    /// (oldest first, matching a scrolling chat view).
    ///
    /// Either the full ordered list or `HistoryFetchFailed` - never a
    /// partial list. A zone with no messages yields an empty list.
    pub async fn history(&self, zone: &Zone) -> Result<Vec<ZoneMessage>> {
        self.history_with_limit(zone, self.config.history_limit)
            .await
    }

    /// Like [`history`](Self::history), keeping only the newest `limit`
    /// rows (still ascending).
    pub async fn history_with_limit(
        &self,
        zone: &Zone,
        limit: Option<usize>,
    ) -> Result<Vec<ZoneMessage>> {
        if zone.is_empty() {
            return Err(ZonalError::history_fetch_failed("zone must be non-empty"));
        }

        let mut rows = self
            .store
            .messages_by_zone(zone)
            .await
            .map_err(|err| ZonalError::history_fetch_failed(err.to_string()))?;
        rows.sort_by_key(|r| r.created_at);
        if let Some(limit) = limit {
            if rows.len() > limit {
                rows.drain(..rows.len() - limit);
            }
        }

        Ok(self.hydrate_rows(rows).await)
    }

    /// Validate and persist a message, returning the hydrated row the
    /// store acknowledged.
    ///
    /// Validation failure makes no store call. Callers must not append the
    /// result to local UI state themselves: the zone's live subscription
    /// echoes the message back, and appending both renders it twice.
    pub async fn send(&self, zone: &Zone, body: &str, author_id: &UserId) -> Result<ZoneMessage> {
        if zone.is_empty() {
            return Err(ZonalError::send_failed("zone must be non-empty"));
        }
        validate_body(body)?;

        let row = self
            .store
            .insert_message(MessageDraft {
                zone: zone.clone(),
                author_id: *author_id,
                body: body.to_string(),
            })
            .await
            .map_err(|err| ZonalError::send_failed(err.to_string()))?;
        tracing::debug!(zone = %zone, message_id = %row.id, "message persisted");

        let profile = self.profile_of(&row.author_id).await;
        Ok(ZoneMessage::hydrate(row, profile.as_ref()))
    }

    /// Best-effort message tally for a zone. Degrades to `0` on any store
    /// failure; this is an informational figure, not a correctness input.
    pub async fn history_count(&self, zone: &Zone) -> u64 {
        match self.store.count_messages(zone).await {
            Ok(count) => count,
            Err(err) => {
                tracing::debug!(zone = %zone, error = %err, "count degraded to zero");
                0
            }
        }
    }

    /// Open a live feed of newly created messages for `zone`.
    ///
    /// Returns synchronously; the transport connects in the background.
    /// Delivery order under concurrent writes is not guaranteed to match
    /// `created_at` - callers needing strict order sort after merging into
    /// history. One zone per handle; cancel before subscribing to another.
    pub fn subscribe(
        &self,
        zone: &Zone,
        handler: impl Fn(ZoneMessage) + Send + Sync + 'static,
    ) -> Subscription {
        Subscription::open(Arc::clone(&self.store), zone.clone(), Arc::new(handler))
    }

    async fn profile_of(&self, author_id: &UserId) -> Option<Profile> {
        self.store.fetch_profile(author_id).await.ok().flatten()
    }

    /// Hydrate rows with author display fields, fetching each distinct
    /// author's profile once. A failed profile fetch falls back to the
    /// truncated-id display name rather than dropping the row.
    async fn hydrate_rows(&self, rows: Vec<MessageRow>) -> Vec<ZoneMessage> {
        let mut profiles: HashMap<UserId, Option<Profile>> = HashMap::new();
        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            let profile = match profiles.get(&row.author_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.profile_of(&row.author_id).await;
                    profiles.insert(row.author_id, fetched.clone());
                    fetched
                }
            };
            messages.push(ZoneMessage::hydrate(row, profile.as_ref()));
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use zonal_core::{RejectReason, Role};
    use zonal_testkit::MemoryRecordStore;

    fn author() -> UserId {
        UserId::from_uuid(Uuid::from_u128(42))
    }

    async fn messenger_with_profile() -> (Arc<MemoryRecordStore>, ZoneMessenger<MemoryRecordStore>)
    {
        let store = Arc::new(MemoryRecordStore::new());
        store
            .seed_profile(Profile {
                user_id: author(),
                email: "staff@example.org".into(),
                display_name: Some("Zone Staff".into()),
                role: Role::Staff,
                zone: Some(Zone::new("Lagos")),
            })
            .await;
        let messenger = ZoneMessenger::new(Arc::clone(&store));
        (store, messenger)
    }

    #[tokio::test]
    async fn validation_failure_makes_no_store_call() {
        let (store, messenger) = messenger_with_profile().await;

        let err = messenger
            .send(&Zone::new("Lagos"), "", &author())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ZonalError::ValidationFailed {
                reason: RejectReason::Empty
            }
        );
        assert_eq!(store.insert_call_count(), 0);
    }

    #[tokio::test]
    async fn empty_zone_is_rejected() {
        let (_store, messenger) = messenger_with_profile().await;

        assert!(messenger.history(&Zone::new("")).await.is_err());
        assert!(messenger
            .send(&Zone::new(""), "hello", &author())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn history_of_quiet_zone_is_empty_not_an_error() {
        let (_store, messenger) = messenger_with_profile().await;

        let history = messenger
            .history(&Zone::new("Lagos"))
            .await
            .expect("empty zone reads fine");
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn sequential_sends_read_back_in_created_at_order() {
        let (_store, messenger) = messenger_with_profile().await;
        let zone = Zone::new("Lagos");

        messenger.send(&zone, "first", &author()).await.unwrap();
        messenger.send(&zone, "second", &author()).await.unwrap();

        let history = messenger.history(&zone).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].body, "first");
        assert_eq!(history[1].body, "second");
        assert!(history[0].created_at < history[1].created_at);
    }

    #[tokio::test]
    async fn history_limit_keeps_newest_rows() {
        let (_store, messenger) = messenger_with_profile().await;
        let zone = Zone::new("Lagos");
        for body in ["one", "two", "three"] {
            messenger.send(&zone, body, &author()).await.unwrap();
        }

        let history = messenger.history_with_limit(&zone, Some(2)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].body, "two");
        assert_eq!(history[1].body, "three");
    }

    #[tokio::test]
    async fn send_hydrates_author_fields() {
        let (_store, messenger) = messenger_with_profile().await;

        let message = messenger
            .send(&Zone::new("Lagos"), "hello", &author())
            .await
            .unwrap();

        assert_eq!(message.author_display_name, "Zone Staff");
        assert_eq!(message.author_role, Role::Staff);
    }

    #[tokio::test]
    async fn messages_sent_to_different_zones_stay_partitioned() {
        let (_store, messenger) = messenger_with_profile().await;

        messenger
            .send(&Zone::new("Lagos"), "lagos only", &author())
            .await
            .unwrap();
        messenger
            .send(&Zone::new("Kano"), "kano only", &author())
            .await
            .unwrap();

        let lagos = messenger.history(&Zone::new("Lagos")).await.unwrap();
        assert_eq!(lagos.len(), 1);
        assert_eq!(lagos[0].body, "lagos only");
        assert_eq!(messenger.history_count(&Zone::new("Kano")).await, 1);
    }

    #[tokio::test]
    async fn store_failures_surface_as_the_right_kinds() {
        let (store, messenger) = messenger_with_profile().await;
        let zone = Zone::new("Lagos");

        store.set_fail_inserts(true);
        let err = messenger.send(&zone, "hello", &author()).await.unwrap_err();
        assert!(matches!(err, ZonalError::SendFailed { .. }));
        store.set_fail_inserts(false);

        store.set_fail_reads(true);
        let err = messenger.history(&zone).await.unwrap_err();
        assert!(matches!(err, ZonalError::HistoryFetchFailed { .. }));
        // The count is informational and degrades instead
        assert_eq!(messenger.history_count(&zone).await, 0);
    }
}
