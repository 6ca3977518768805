//! SessionService: owns the session state and keeps it in step with the store.
//!
//! Mutations are single-flight: an async mutex serializes them so two
//! overlapping logins or a login racing a sign-out cannot interleave writes.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, RwLock};

use crate::error::StorageError;
use crate::store::KeyValueStore;
use crate::store::keys;

use super::state::{LoadPhase, SessionState, UserIdentity, UserType};

/// Owns the device session and the mutators screens are allowed to call.
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    phase: RwLock<LoadPhase>,
    state: RwLock<SessionState>,
    op_lock: Mutex<()>,
}

impl SessionService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            phase: RwLock::new(LoadPhase::Uninitialized),
            state: RwLock::new(SessionState::default()),
            op_lock: Mutex::new(()),
        }
    }

    pub async fn phase(&self) -> LoadPhase {
        *self.phase.read().await
    }

    /// Read-only copy of the current session.
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Enter `Loading`. No-op outside `Uninitialized`.
    pub async fn begin_loading(&self) {
        let mut phase = self.phase.write().await;
        if phase.can_transition_to(LoadPhase::Loading) {
            *phase = LoadPhase::Loading;
        } else {
            tracing::warn!(phase = %*phase, "Session already loaded, ignoring begin_loading");
        }
    }

    /// Install the loaded session and enter `Ready`.
    pub async fn finish_loading(&self, loaded: SessionState) {
        let mut phase = self.phase.write().await;
        if !phase.can_transition_to(LoadPhase::Ready) {
            tracing::warn!(phase = %*phase, "Session not loading, ignoring finish_loading");
            return;
        }
        *self.state.write().await = loaded;
        *phase = LoadPhase::Ready;
    }

    /// Persist a session token and mark the user as logged in.
    ///
    /// The store is written first; memory changes only once every write has
    /// succeeded. Any identity cached by an earlier login is dropped.
    pub async fn login(&self, token: &SecretString, user_type: UserType) -> Result<(), StorageError> {
        self.login_with_user(token, user_type, None).await
    }

    /// Like [`Self::login`], also caching the user's identity fields.
    ///
    /// If a write fails, every key already touched is put back to the value it
    /// held before the call, so the store keeps describing the previous
    /// session, which is also what memory still holds.
    pub async fn login_with_user(
        &self,
        token: &SecretString,
        user_type: UserType,
        user: Option<&UserIdentity>,
    ) -> Result<(), StorageError> {
        let _guard = self.op_lock.lock().await;

        let mut writes: Vec<(&'static str, Option<String>)> = vec![
            (keys::TOKEN, Some(token.expose_secret().to_string())),
            (keys::USER_TYPE, Some(user_type.as_str().to_string())),
            (keys::IS_LOGGED_IN, Some(keys::TRUE_SENTINEL.to_string())),
            (keys::USER_PROFILE, Some(user_type.as_str().to_string())),
        ];
        writes.extend([
            (keys::USER_ID, user.map(|u| u.id.clone())),
            (keys::USER_NAME, user.map(|u| u.name.clone())),
            (keys::USER_EMAIL, user.map(|u| u.email.clone())),
        ]);

        let mut prior: Vec<(&'static str, Option<String>)> = Vec::with_capacity(writes.len());
        for (key, _) in &writes {
            prior.push((*key, self.store.get(key).await?));
        }

        for (done, (key, value)) in writes.iter().enumerate() {
            if let Err(e) = self.put(key, value.as_deref()).await {
                tracing::error!(key, error = %e, "Login persistence failed, restoring previous values");
                self.restore(&prior[..done]).await;
                return Err(e);
            }
        }

        let mut state = self.state.write().await;
        state.is_logged_in = true;
        state.user_profile = Some(user_type);
        state.user_id = user.map(|u| u.id.clone());
        state.user_name = user.map(|u| u.name.clone());
        state.user_email = user.map(|u| u.email.clone());
        tracing::info!(%user_type, "Logged in");
        Ok(())
    }

    /// Clear every session key and reset the in-memory session.
    ///
    /// Always succeeds; removal failures are logged.
    pub async fn sign_out(&self) {
        let _guard = self.op_lock.lock().await;

        self.remove_all(keys::SESSION_KEYS.iter().copied()).await;
        self.state.write().await.clear_identity();
        tracing::info!("Signed out");
    }

    /// Record that the onboarding flow is done.
    pub async fn complete_onboarding(&self) -> Result<(), StorageError> {
        let _guard = self.op_lock.lock().await;

        self.store
            .set(keys::ONBOARDING_COMPLETED, keys::TRUE_SENTINEL)
            .await?;
        self.state.write().await.has_completed_onboarding = true;
        tracing::info!("Onboarding completed");
        Ok(())
    }

    /// Forget onboarding progress so the next bootstrap routes to onboarding.
    ///
    /// Debug escape hatch. Login state is left alone.
    pub async fn reset_onboarding(&self) {
        let _guard = self.op_lock.lock().await;

        self.remove_all([keys::ONBOARDING_COMPLETED, keys::ONBOARDING_STARTED])
            .await;
        self.state.write().await.has_completed_onboarding = false;
        tracing::info!("Onboarding reset");
    }

    /// Record that the user got past the welcome screen.
    pub async fn mark_onboarding_started(&self) -> Result<(), StorageError> {
        let _guard = self.op_lock.lock().await;
        self.store
            .set(keys::ONBOARDING_STARTED, keys::TRUE_SENTINEL)
            .await
    }

    /// Whether the welcome screen has been passed.
    pub async fn onboarding_started(&self) -> Result<bool, StorageError> {
        let raw = self.store.get(keys::ONBOARDING_STARTED).await?;
        Ok(keys::is_true(raw.as_deref()))
    }

    /// Remember which profile the user picked before signing up.
    pub async fn select_profile(&self, user_type: UserType) -> Result<(), StorageError> {
        let _guard = self.op_lock.lock().await;

        self.store
            .set(keys::USER_PROFILE, user_type.as_str())
            .await?;
        self.state.write().await.user_profile = Some(user_type);
        Ok(())
    }

    /// The persisted session token, if any.
    pub async fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.store.get(keys::TOKEN).await?.map(SecretString::from))
    }

    /// Write `value`, or remove the key when there is none.
    async fn put(&self, key: &str, value: Option<&str>) -> Result<(), StorageError> {
        match value {
            Some(value) => self.store.set(key, value).await,
            None => self.store.remove(key).await,
        }
    }

    async fn restore(&self, prior: &[(&'static str, Option<String>)]) {
        for (key, value) in prior {
            if let Err(e) = self.put(key, value.as_deref()).await {
                tracing::warn!(key, error = %e, "Failed to restore session key");
            }
        }
    }

    async fn remove_all<I>(&self, keys: I)
    where
        I: IntoIterator<Item = &'static str>,
    {
        for key in keys {
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!(key, error = %e, "Failed to remove session key");
            }
        }
    }
}
