//! The session controller state machine.
//!
//! Resolves credentials from the external provider into trusted principals
//! by joining them with the profile record in the store, and publishes the
//! result through the [`IdentityStore`]. Every operation ends in a terminal
//! resolved state; no failure path leaves the identity store half-written
//! or stuck unresolved.

use crate::store::IdentityStore;
use std::sync::Arc;
use tokio::sync::broadcast;
use zonal_core::effects::{AuthEvent, Credential, CredentialEffects, RecordStoreEffects};
use zonal_core::{Principal, Profile, Result, Role, Zone, ZonalError};

/// Resolves provider credentials into published principals.
///
/// Constructor-injected collaborators; one instance per process in
/// practice, freely constructible in tests.
pub struct SessionController<A, S> {
    auth: Arc<A>,
    store: Arc<S>,
    identity: IdentityStore,
}

impl<A, S> SessionController<A, S>
where
    A: CredentialEffects,
    S: RecordStoreEffects,
{
    /// Create a controller writing to the given identity store.
    pub fn new(auth: Arc<A>, store: Arc<S>, identity: IdentityStore) -> Self {
        Self {
            auth,
            store,
            identity,
        }
    }

    /// The identity store this controller publishes to.
    pub fn identity(&self) -> &IdentityStore {
        &self.identity
    }

    /// Resolve any existing provider session at process start.
    ///
    /// Always terminates in a resolved principal: a valid credential with a
    /// matching profile yields an authenticated principal; anything else -
    /// no session, provider outage, missing profile - degrades to
    /// unauthenticated. Lookup errors are treated as "no session", never
    /// surfaced.
    pub async fn restore_session(&self) -> Principal {
        let principal = match self.auth.restore_credential().await {
            Ok(Some(credential)) => match self.resolve(&credential).await {
                Ok(principal) => principal,
                Err(err) => {
                    tracing::debug!(
                        error = %err,
                        "restore found a credential without a usable profile"
                    );
                    Principal::unauthenticated()
                }
            },
            Ok(None) => Principal::unauthenticated(),
            Err(err) => {
                tracing::debug!(error = %err, "restore lookup failed, treating as no session");
                Principal::unauthenticated()
            }
        };
        self.identity.replace(principal.clone());
        principal
    }

    /// Exchange an email/password pair for an authenticated principal.
    ///
    /// Both inputs must be non-empty. A valid credential whose profile row
    /// is missing fails with `ProfileNotFound`; the provider session is
    /// torn down so the orphaned credential is not left live, and nothing
    /// partial is published.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ZonalError::credential_invalid(
                "email and password must be non-empty",
            ));
        }

        let credential = self
            .auth
            .sign_in_with_password(email, password)
            .await
            .map_err(|err| ZonalError::credential_invalid(err.to_string()))?;

        match self.resolve(&credential).await {
            Ok(principal) => {
                self.identity.replace(principal.clone());
                tracing::debug!(user_id = %credential.user_id, "sign-in resolved");
                Ok(principal)
            }
            Err(err) => {
                if let Err(teardown) = self.auth.sign_out().await {
                    tracing::warn!(
                        error = %teardown,
                        "provider teardown after orphaned credential failed"
                    );
                }
                self.identity.replace(Principal::unauthenticated());
                Err(err)
            }
        }
    }

    /// Register a new account: credential first, then the profile row, then
    /// the published principal.
    ///
    /// A zone assignment makes the new account [`Role::Staff`]; without one
    /// it is [`Role::Public`]. If the profile insert fails after the
    /// credential was created, the provider session is signed back out and
    /// no principal is published.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
        zone: Option<Zone>,
    ) -> Result<Principal> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ZonalError::credential_invalid(
                "email and password must be non-empty",
            ));
        }

        let credential = self
            .auth
            .sign_up_with_password(email, password)
            .await
            .map_err(|err| ZonalError::credential_invalid(err.to_string()))?;

        let role = if zone.is_some() {
            Role::Staff
        } else {
            Role::Public
        };
        let profile = Profile {
            user_id: credential.user_id,
            email: credential.email.clone(),
            display_name,
            role,
            zone,
        };

        if let Err(err) = self.store.insert_profile(profile.clone()).await {
            if let Err(teardown) = self.auth.sign_out().await {
                tracing::warn!(
                    error = %teardown,
                    "provider teardown after failed registration failed"
                );
            }
            return Err(ZonalError::credential_invalid(format!(
                "registration incomplete: {err}"
            )));
        }

        let principal = Principal::from_profile(&profile);
        self.identity.replace(principal.clone());
        tracing::debug!(user_id = %credential.user_id, role = ?role, "sign-up resolved");
        Ok(principal)
    }

    /// End the session.
    ///
    /// The identity store is cleared to a resolved unauthenticated
    /// principal *before* the provider teardown, so dependent subsystems
    /// observe "no principal" promptly even if the provider lags by a tick.
    /// A provider error at this point is logged and swallowed - the local
    /// session is already gone.
    pub async fn sign_out(&self) {
        self.identity.replace(Principal::unauthenticated());
        if let Err(err) = self.auth.sign_out().await {
            tracing::warn!(error = %err, "provider sign-out failed after local teardown");
        }
    }

    /// Consume the provider's auth event feed until it closes.
    ///
    /// Sign-in and token-refresh events re-resolve the profile and
    /// republish; sign-out clears. Resolution failures degrade to
    /// unauthenticated. Callers typically spawn this on a task holding an
    /// `Arc<SessionController>`.
    pub async fn run_auth_events(&self) {
        let mut events = self.auth.auth_events();
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedIn(credential))
                | Ok(AuthEvent::TokenRefreshed(credential)) => {
                    let principal = match self.resolve(&credential).await {
                        Ok(principal) => principal,
                        Err(err) => {
                            tracing::debug!(
                                user_id = %credential.user_id,
                                error = %err,
                                "auth event resolution failed"
                            );
                            Principal::unauthenticated()
                        }
                    };
                    self.identity.replace(principal);
                }
                Ok(AuthEvent::SignedOut) => {
                    self.identity.replace(Principal::unauthenticated());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Join a credential with its profile row. The profile is what makes
    /// the credential a trusted principal; a missing or unreadable row is
    /// `ProfileNotFound`.
    async fn resolve(&self, credential: &Credential) -> Result<Principal> {
        let profile = self
            .store
            .fetch_profile(&credential.user_id)
            .await
            .map_err(|err| {
                ZonalError::profile_not_found(format!("profile lookup failed: {err}"))
            })?
            .ok_or_else(|| {
                ZonalError::profile_not_found(format!(
                    "no profile for user {}",
                    credential.user_id
                ))
            })?;
        Ok(Principal::from_profile(&profile))
    }
}
