//! Zonal Testing Infrastructure
//!
//! Deterministic in-memory implementations of the Zonal collaborator
//! contracts, to eliminate duplicated mock setup across test modules.
//! Identifiers and timestamps come from atomic counters, so test runs are
//! reproducible without seeding.
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! zonal-testkit = { workspace = true }
//! ```
//!
//! Then in your tests:
//! ```rust,no_run
//! use std::sync::Arc;
//! use zonal_testkit::{MemoryRecordStore, MockCredentialProvider};
//!
//! # async fn demo() {
//! let store = Arc::new(MemoryRecordStore::new());
//! let provider = Arc::new(MockCredentialProvider::new());
//! let staff = provider.register_user("staff@example.org", "pw").await;
//! # let _ = (store, staff);
//! # }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod auth;
pub mod store;

pub use auth::MockCredentialProvider;
pub use store::MemoryRecordStore;
