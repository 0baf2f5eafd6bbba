//! Live subscription handles.
//!
//! A [`Subscription`] owns one zone's insert feed: a pump task that opens
//! the transport channel, deduplicates rows by id, hydrates author display
//! fields, and invokes the caller's handler. The handle walks `Opening ->
//! Live -> Closing -> Inert`; explicit cancellation forces `Closing ->
//! Inert` from any state.
//!
//! Handler dispatch and cancellation contend on the same mutex. A delivery
//! racing with `cancel` therefore either completes before `cancel` returns
//! or observes the closed state and is suppressed - there is no late
//! callback.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use zonal_core::effects::RecordStoreEffects;
use zonal_core::{MessageId, Zone, ZonalError, ZoneMessage};

/// Caller-supplied delivery callback.
pub type MessageHandler = Arc<dyn Fn(ZoneMessage) + Send + Sync>;

/// Lifecycle of one subscription handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Transport channel is being established
    Opening,
    /// Events are flowing to the handler
    Live,
    /// Cancellation has begun; no further handler invocations
    Closing,
    /// Terminal: the handle delivers nothing and cancelling is a no-op
    Inert,
}

struct Shared {
    state: Mutex<HandleState>,
    handler: MessageHandler,
}

impl Shared {
    /// Deliver one message if the handle is still live. The handler runs
    /// under the state lock, which is what makes cancellation final: once
    /// `cancel` has taken the lock and left `Closing`, no dispatch can
    /// start, and a dispatch already holding the lock finishes before
    /// `cancel` can proceed.
    fn dispatch(&self, message: ZoneMessage) -> bool {
        let state = self.state.lock();
        if *state != HandleState::Live {
            return false;
        }
        (self.handler)(message);
        true
    }
}

/// A live, cancellable feed of newly created messages for one zone.
///
/// Dropping the handle cancels it. One zone per handle: to observe a
/// different zone, cancel this handle and subscribe anew.
pub struct Subscription {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    /// Open a feed for `zone`. Returns synchronously; the transport
    /// connects on a spawned pump task. If the channel cannot be
    /// established the handle parks itself `Inert` and delivers nothing -
    /// the caller never has to special-case a missing subscription.
    pub(crate) fn open<S>(store: Arc<S>, zone: Zone, handler: MessageHandler) -> Self
    where
        S: RecordStoreEffects + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(HandleState::Opening),
            handler,
        });
        let pump = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            Self::run_pump(store, zone, pump).await;
        });
        Self {
            shared,
            task: Mutex::new(Some(task)),
        }
    }

    async fn run_pump<S>(store: Arc<S>, zone: Zone, shared: Arc<Shared>)
    where
        S: RecordStoreEffects + 'static,
    {
        let mut feed = match store.subscribe_inserts(&zone).await {
            Ok(feed) => feed,
            Err(err) => {
                let err = ZonalError::subscription_open_failed(err.to_string());
                tracing::warn!(zone = %zone, error = %err, "live feed unavailable, handle parked");
                let mut state = shared.state.lock();
                if *state == HandleState::Opening {
                    *state = HandleState::Inert;
                }
                return;
            }
        };

        {
            let mut state = shared.state.lock();
            if *state != HandleState::Opening {
                // Cancelled while the channel was connecting
                return;
            }
            *state = HandleState::Live;
        }
        tracing::debug!(zone = %zone, "live feed established");

        // Seen-id set: at-least-once transport delivery becomes exactly-once
        // handler invocation. Private to this handle, discarded with it.
        let mut seen: HashSet<MessageId> = HashSet::new();
        loop {
            match feed.recv().await {
                Ok(row) => {
                    if !seen.insert(row.id) {
                        continue;
                    }
                    let profile = store.fetch_profile(&row.author_id).await.ok().flatten();
                    let message = ZoneMessage::hydrate(row, profile.as_ref());
                    if !shared.dispatch(message) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(zone = %zone, skipped, "insert feed lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }

        let mut state = shared.state.lock();
        if *state == HandleState::Live {
            *state = HandleState::Inert;
        }
    }

    /// The handle's current lifecycle state.
    pub fn state(&self) -> HandleState {
        *self.shared.state.lock()
    }

    /// True while events are flowing to the handler.
    pub fn is_live(&self) -> bool {
        self.state() == HandleState::Live
    }

    /// Cancel the feed.
    ///
    /// Idempotent: the second and later calls are no-ops. When this
    /// returns, the handler will not be invoked again - an in-flight
    /// delivery has either completed or been suppressed - and the
    /// underlying transport channel is being torn down.
    ///
    /// Must not be called from inside the delivery handler itself; the
    /// handler runs under the same lock cancellation takes.
    pub fn cancel(&self) {
        {
            let mut state = self.shared.state.lock();
            if matches!(*state, HandleState::Closing | HandleState::Inert) {
                return;
            }
            *state = HandleState::Closing;
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        *self.shared.state.lock() = HandleState::Inert;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("state", &self.state())
            .finish()
    }
}
