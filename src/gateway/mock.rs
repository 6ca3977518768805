//! Mock gateway: the demo accounts used while the auth API is not live.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{AuthError, StorageError};
use crate::session::{UserIdentity, UserType};
use crate::store::KeyValueStore;
use crate::store::keys;

use super::{AccountProfile, AdminSignup, AuthGateway, AuthResponse, DriverSignup, ProfileUpdate};

/// A canned account.
struct MockAccount {
    email: &'static str,
    password: &'static str,
    token: &'static str,
    user_type: UserType,
    id: &'static str,
    name: &'static str,
}

const ACCOUNTS: &[MockAccount] = &[
    MockAccount {
        email: "admin@teste.com",
        password: "123456",
        token: "admin-fake-token-12345",
        user_type: UserType::Admin,
        id: "1",
        name: "Admin Teste",
    },
    MockAccount {
        email: "motorista@teste.com",
        password: "123456",
        token: "driver-fake-token-12345",
        user_type: UserType::Driver,
        id: "2",
        name: "Motorista Teste",
    },
];

fn canned_profile(user_type: UserType) -> AccountProfile {
    match user_type {
        UserType::Admin => AccountProfile {
            id: "1".into(),
            name: "Admin Teste".into(),
            email: "admin@teste.com".into(),
            role: UserType::Admin,
            phone: Some("(11) 98765-4321".into()),
            company: Some("Borgno".into()),
            license: None,
            license_due_date: None,
            address: None,
        },
        UserType::Driver => AccountProfile {
            id: "2".into(),
            name: "Motorista Teste".into(),
            email: "motorista@teste.com".into(),
            role: UserType::Driver,
            phone: Some("(11) 91234-5678".into()),
            company: None,
            license: Some("12345678900".into()),
            license_due_date: Some("31/12/2025".into()),
            address: Some("Av. Paulista, 1000".into()),
        },
    }
}

/// Answers from a fixed account table after a simulated network delay.
///
/// Profile calls read the session token and user type from the store, the
/// same way the HTTP gateway authenticates them.
pub struct MockGateway {
    delay: Duration,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl MockGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay, store: None }
    }

    /// Serve profile calls for the session persisted in `store`.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// No delay, for tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Canned profile for the stored session; admins get the admin record,
    /// anyone else the driver one.
    async fn session_profile(&self) -> Result<AccountProfile, AuthError> {
        let store = self.store.as_ref().ok_or(AuthError::NotAuthenticated)?;
        let read = |e: StorageError| AuthError::Transport(e.to_string());

        if store.get(keys::TOKEN).await.map_err(read)?.is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        let user_type = match store.get(keys::USER_TYPE).await.map_err(read)?.as_deref() {
            Some("admin") => UserType::Admin,
            _ => UserType::Driver,
        };
        Ok(canned_profile(user_type))
    }

    fn response(token: &str, user_type: UserType, id: &str, name: &str, email: &str) -> AuthResponse {
        AuthResponse {
            token: SecretString::from(token.to_string()),
            user_type,
            user: UserIdentity {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
            },
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl AuthGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn login(&self, email: &str, password: &SecretString) -> Result<AuthResponse, AuthError> {
        let account = ACCOUNTS
            .iter()
            .find(|a| a.email == email && a.password == password.expose_secret())
            .ok_or_else(|| {
                tracing::debug!(email, "Mock login rejected");
                AuthError::InvalidCredentials
            })?;

        self.simulate_latency().await;
        Ok(Self::response(
            account.token,
            account.user_type,
            account.id,
            account.name,
            account.email,
        ))
    }

    async fn register_admin(&self, signup: &AdminSignup) -> Result<AuthResponse, AuthError> {
        self.simulate_latency().await;
        Ok(Self::response(
            "admin-new-token-12345",
            UserType::Admin,
            "3",
            &signup.name,
            &signup.email,
        ))
    }

    async fn register_driver(&self, signup: &DriverSignup) -> Result<AuthResponse, AuthError> {
        self.simulate_latency().await;
        Ok(Self::response(
            "driver-new-token-12345",
            UserType::Driver,
            "4",
            &signup.name,
            &signup.email,
        ))
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.simulate_latency().await;
        tracing::debug!(email, "Mock password reset requested");
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<AccountProfile, AuthError> {
        let profile = self.session_profile().await?;
        self.simulate_latency().await;
        Ok(profile)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AccountProfile, AuthError> {
        let mut profile = self.session_profile().await?;
        self.simulate_latency().await;
        update.apply_to(&mut profile);
        Ok(profile)
    }
}
