//! Scripted credential provider.
//!
//! Users are registered up front with `register_user`; restore behavior and
//! provider outages are controlled per-test. The auth event feed is a plain
//! broadcast channel that tests drive with [`MockCredentialProvider::emit`].

use async_trait::async_trait;
use futures::lock::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;
use zonal_core::effects::{AuthError, AuthEvent, Credential, CredentialEffects};
use zonal_core::UserId;

/// Buffer depth of the auth event feed.
const EVENT_CAPACITY: usize = 16;

struct Account {
    password: String,
    user_id: UserId,
}

/// Scripted implementation of [`CredentialEffects`].
pub struct MockCredentialProvider {
    accounts: Mutex<HashMap<String, Account>>,
    restored: Mutex<Option<Credential>>,
    events: broadcast::Sender<AuthEvent>,
    next_user: AtomicU64,
    fail_restore: AtomicBool,
    sign_out_calls: AtomicU64,
}

impl MockCredentialProvider {
    /// Create a provider with no accounts and no restorable session
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: Mutex::new(HashMap::new()),
            restored: Mutex::new(None),
            events,
            next_user: AtomicU64::new(0),
            fail_restore: AtomicBool::new(false),
            sign_out_calls: AtomicU64::new(0),
        }
    }

    /// Register an account and return its deterministic user id
    pub async fn register_user(&self, email: &str, password: &str) -> UserId {
        let user_id = UserId::from_uuid(Uuid::from_u128(
            self.next_user.fetch_add(1, Ordering::SeqCst) as u128 + 0x1000,
        ));
        self.accounts.lock().await.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id,
            },
        );
        user_id
    }

    /// Script the credential that `restore_credential` will return
    pub async fn set_restored(&self, credential: Option<Credential>) {
        *self.restored.lock().await = credential;
    }

    /// Make `restore_credential` fail with a provider error
    pub fn set_fail_restore(&self, fail: bool) {
        self.fail_restore.store(fail, Ordering::SeqCst);
    }

    /// Push an event down the provider's feed
    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    /// How many times `sign_out` has been called
    pub fn sign_out_calls(&self) -> u64 {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialEffects for MockCredentialProvider {
    async fn restore_credential(&self) -> Result<Option<Credential>, AuthError> {
        if self.fail_restore.load(Ordering::SeqCst) {
            return Err(AuthError::provider("injected provider outage"));
        }
        Ok(self.restored.lock().await.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let accounts = self.accounts.lock().await;
        match accounts.get(email) {
            Some(account) if account.password == password => {
                let credential = Credential {
                    user_id: account.user_id,
                    email: email.to_string(),
                };
                drop(accounts);
                *self.restored.lock().await = Some(credential.clone());
                Ok(credential)
            }
            _ => Err(AuthError::invalid_credentials("email or password rejected")),
        }
    }

    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        if self.accounts.lock().await.contains_key(email) {
            return Err(AuthError::invalid_credentials("email already registered"));
        }
        let user_id = self.register_user(email, password).await;
        let credential = Credential {
            user_id,
            email: email.to_string(),
        };
        *self.restored.lock().await = Some(credential.clone());
        Ok(credential)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.restored.lock().await = None;
        Ok(())
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
