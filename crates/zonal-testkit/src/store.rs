//! In-memory record store with deterministic ids and timestamps.
//!
//! Rows get `Uuid::from_u128(counter)` ids and counter-driven millisecond
//! timestamps, so insertion order and `created_at` order always agree.
//! Failure flags let tests exercise every degraded path without a real
//! transport, and the insert call counter lets tests assert that an
//! operation performed no store write.

use async_trait::async_trait;
use futures::lock::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;
use zonal_core::effects::{RecordStoreEffects, StoreError};
use zonal_core::{MessageDraft, MessageId, MessageRow, Profile, Timestamp, UserId, Zone};

/// Buffer depth of each per-zone insert feed.
const FEED_CAPACITY: usize = 64;

/// Deterministic in-memory implementation of [`RecordStoreEffects`].
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    profiles: Mutex<HashMap<UserId, Profile>>,
    messages: Mutex<Vec<MessageRow>>,
    feeds: Mutex<HashMap<Zone, broadcast::Sender<MessageRow>>>,
    id_counter: AtomicU64,
    clock_ms: AtomicU64,
    insert_calls: AtomicU64,
    fail_reads: AtomicBool,
    fail_inserts: AtomicBool,
    fail_subscribe: AtomicBool,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile row
    pub async fn seed_profile(&self, profile: Profile) {
        self.profiles.lock().await.insert(profile.user_id, profile);
    }

    /// Remove a profile row, simulating an orphaned credential
    pub async fn remove_profile(&self, user_id: &UserId) {
        self.profiles.lock().await.remove(user_id);
    }

    /// Simulate a server-side insert from another client: the row is
    /// persisted and pushed to the zone's live feed.
    pub async fn inject_insert(&self, zone: &Zone, author_id: UserId, body: &str) -> MessageRow {
        let row = self.persist(MessageDraft {
            zone: zone.clone(),
            author_id,
            body: body.to_string(),
        })
        .await;
        self.publish(&row).await;
        row
    }

    /// Push an already-delivered row down the feed again, simulating
    /// at-least-once transport behavior.
    pub async fn redeliver(&self, row: &MessageRow) {
        self.publish(row).await;
    }

    /// How many times `insert_message` has been called, including failures
    pub fn insert_call_count(&self) -> u64 {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Make all read operations fail with [`StoreError::Unavailable`]
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make all writes fail with [`StoreError::Unavailable`]
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make `subscribe_inserts` fail with [`StoreError::Channel`]
    pub fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    async fn persist(&self, draft: MessageDraft) -> MessageRow {
        let id = MessageId::from_uuid(Uuid::from_u128(
            self.id_counter.fetch_add(1, Ordering::SeqCst) as u128 + 1,
        ));
        let created_at = Timestamp::from_millis(self.clock_ms.fetch_add(1, Ordering::SeqCst) + 1);
        let row = MessageRow {
            id,
            zone: draft.zone,
            author_id: draft.author_id,
            body: draft.body,
            created_at,
        };
        self.messages.lock().await.push(row.clone());
        row
    }

    async fn publish(&self, row: &MessageRow) {
        let mut feeds = self.feeds.lock().await;
        let sender = feeds
            .entry(row.zone.clone())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0);
        // A send error just means nobody is subscribed to this zone
        let _ = sender.send(row.clone());
    }
}

#[async_trait]
impl RecordStoreEffects for MemoryRecordStore {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected read failure"));
        }
        Ok(self.profiles.lock().await.get(user_id).cloned())
    }

    async fn insert_profile(&self, profile: Profile) -> Result<(), StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected write failure"));
        }
        self.profiles.lock().await.insert(profile.user_id, profile);
        Ok(())
    }

    async fn messages_by_zone(&self, zone: &Zone) -> Result<Vec<MessageRow>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected read failure"));
        }
        let mut rows: Vec<MessageRow> = self
            .messages
            .lock()
            .await
            .iter()
            .filter(|r| &r.zone == zone)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn insert_message(&self, draft: MessageDraft) -> Result<MessageRow, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected write failure"));
        }
        let row = self.persist(draft).await;
        self.publish(&row).await;
        Ok(row)
    }

    async fn count_messages(&self, zone: &Zone) -> Result<u64, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected read failure"));
        }
        let count = self
            .messages
            .lock()
            .await
            .iter()
            .filter(|r| &r.zone == zone)
            .count();
        Ok(count as u64)
    }

    async fn subscribe_inserts(
        &self,
        zone: &Zone,
    ) -> Result<broadcast::Receiver<MessageRow>, StoreError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(StoreError::channel("injected channel failure"));
        }
        let mut feeds = self.feeds.lock().await;
        let sender = feeds
            .entry(zone.clone())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0);
        Ok(sender.subscribe())
    }
}
