//! Server-authoritative timestamps.
//!
//! The core never reads a wall clock of its own; every [`Timestamp`] comes
//! from the record store, attached to a persisted row. Millisecond
//! precision, totally ordered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch, as assigned by the backing store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Timestamp {
    /// Epoch milliseconds
    pub ts_ms: u64,
}

impl Timestamp {
    /// Create from epoch milliseconds
    pub fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Epoch milliseconds
    pub fn as_millis(&self) -> u64 {
        self.ts_ms
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}
