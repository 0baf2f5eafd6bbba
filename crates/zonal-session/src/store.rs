//! The process-wide identity container.
//!
//! An explicitly owned, injectable state holder rather than a global, so
//! tests can instantiate independent controllers without cross-test
//! leakage. Writes are whole-object replacements over a watch channel;
//! readers either take a snapshot or watch for changes. Only the
//! [`SessionController`](crate::SessionController) may write.

use std::sync::Arc;
use tokio::sync::watch;
use zonal_core::Principal;

/// Holder of the current [`Principal`].
///
/// Cloning the store clones a handle to the same underlying state.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    tx: Arc<watch::Sender<Principal>>,
}

impl IdentityStore {
    /// Create a store holding the initial unresolved principal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Principal::unresolved());
        Self { tx: Arc::new(tx) }
    }

    /// The current principal, cloned out.
    pub fn snapshot(&self) -> Principal {
        self.tx.borrow().clone()
    }

    /// Replace the principal wholesale and notify watchers.
    ///
    /// Whole-object replacement is the only write primitive; there is no
    /// field-level mutation, so a reader can never see a torn update.
    pub fn replace(&self, principal: Principal) {
        self.tx.send_replace(principal);
    }

    /// Watch for principal changes. The receiver immediately holds the
    /// current value.
    pub fn watch(&self) -> watch::Receiver<Principal> {
        self.tx.subscribe()
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new()
    }
}
