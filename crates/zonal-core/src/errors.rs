//! Unified error taxonomy for the Zonal core.
//!
//! Every operation in the session and messaging crates resolves to one of
//! these variants. Collaborator errors are normalized into this taxonomy at
//! the boundary where they are caught, so internal logic never branches on
//! library-specific error shapes.

use crate::validate::RejectReason;
use serde::{Deserialize, Serialize};

/// Closed error taxonomy for all Zonal operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ZonalError {
    /// Wrong email/password, or no usable session
    #[error("Credential invalid: {message}")]
    CredentialInvalid {
        /// What the provider rejected
        message: String,
    },

    /// Credential valid but no profile record - an orphaned credential is
    /// not a usable session
    #[error("Profile not found: {message}")]
    ProfileNotFound {
        /// Which lookup came back empty
        message: String,
    },

    /// Outbound message body rejected before any network call
    #[error("Validation failed: {reason}")]
    ValidationFailed {
        /// Why the body was rejected
        reason: RejectReason,
    },

    /// Transport/store error while fetching zone history
    #[error("History fetch failed: {message}")]
    HistoryFetchFailed {
        /// Underlying store failure
        message: String,
    },

    /// Transport/store error after validation passed
    #[error("Send failed: {message}")]
    SendFailed {
        /// Underlying store failure
        message: String,
    },

    /// Live channel could not be established. Recovered internally by
    /// parking the subscription handle inert; callers never see this from
    /// `subscribe`.
    #[error("Subscription open failed: {message}")]
    SubscriptionOpenFailed {
        /// Underlying transport failure
        message: String,
    },
}

impl ZonalError {
    /// Create a credential-invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::CredentialInvalid {
            message: message.into(),
        }
    }

    /// Create a profile-not-found error
    pub fn profile_not_found(message: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            message: message.into(),
        }
    }

    /// Create a validation-failed error
    pub fn validation_failed(reason: RejectReason) -> Self {
        Self::ValidationFailed { reason }
    }

    /// Create a history-fetch-failed error
    pub fn history_fetch_failed(message: impl Into<String>) -> Self {
        Self::HistoryFetchFailed {
            message: message.into(),
        }
    }

    /// Create a send-failed error
    pub fn send_failed(message: impl Into<String>) -> Self {
        Self::SendFailed {
            message: message.into(),
        }
    }

    /// Create a subscription-open-failed error
    pub fn subscription_open_failed(message: impl Into<String>) -> Self {
        Self::SubscriptionOpenFailed {
            message: message.into(),
        }
    }
}

impl From<RejectReason> for ZonalError {
    fn from(reason: RejectReason) -> Self {
        Self::ValidationFailed { reason }
    }
}

/// Standard Result type for Zonal operations
pub type Result<T> = std::result::Result<T, ZonalError>;
