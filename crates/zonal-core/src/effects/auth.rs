//! Credential provider effect trait.
//!
//! The provider owns raw credentials; the core never sees passwords after
//! handing them over and never stores tokens. A [`Credential`] is only ever
//! an input to profile resolution - it is not a trusted principal by
//! itself.

use crate::identifiers::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Error type for credential provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AuthError {
    /// Email/password pair rejected, or no session to restore
    #[error("Invalid credentials: {message}")]
    InvalidCredentials {
        /// Provider's rejection detail
        message: String,
    },
    /// Provider/network failure unrelated to the credentials themselves
    #[error("Provider error: {message}")]
    Provider {
        /// Underlying failure detail
        message: String,
    },
}

impl AuthError {
    /// Create an invalid-credentials error
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

/// A provider-issued credential: proof that sign-in succeeded, nothing
/// more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Stable user identity the provider vouches for
    pub user_id: UserId,
    /// Email the credential was issued against
    pub email: String,
}

/// Events the provider pushes as the underlying session changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEvent {
    /// A session was established (interactive sign-in or restore)
    SignedIn(Credential),
    /// The session ended
    SignedOut,
    /// The session's token was refreshed; identity must be re-resolved
    TokenRefreshed(Credential),
}

/// Contract for the external identity/credential provider.
#[async_trait]
pub trait CredentialEffects: Send + Sync {
    /// Look up an existing valid credential, if any. `Ok(None)` means "no
    /// session" and is not an error.
    async fn restore_credential(&self) -> Result<Option<Credential>, AuthError>;

    /// Exchange an email/password pair for a credential.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError>;

    /// Register a new account and return its credential.
    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError>;

    /// Tear down the provider-side session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to the provider's session event feed. Delivery is
    /// at-least-once on the receiver's own scheduling context.
    fn auth_events(&self) -> broadcast::Receiver<AuthEvent>;
}
