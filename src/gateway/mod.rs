//! Remote auth gateway: credentials in, session token out.
//!
//! Two implementations sit behind [`AuthGateway`]: [`MockGateway`] answers from
//! a fixed account table after a simulated delay, [`HttpGateway`] talks JSON
//! to the auth API.

pub mod http;
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, GatewayKind};
use crate::error::{AuthError, ConfigError};
use crate::session::{UserIdentity, UserType};
use crate::store::KeyValueStore;

pub use http::HttpGateway;
pub use mock::MockGateway;

/// Successful authentication or registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: SecretString,
    pub user_type: UserType,
    pub user: UserIdentity,
}

/// Which office an administrator belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Headquarters,
    /// A branch office, by name. An empty name means none was picked.
    Branch(String),
}

/// Administrator signup form.
#[derive(Debug)]
pub struct AdminSignup {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub unit: Unit,
    pub phone: String,
}

/// Driver signup form.
#[derive(Debug)]
pub struct DriverSignup {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub phone: String,
    /// Driver's license number.
    pub license: String,
    pub license_due_date: Option<String>,
    pub address: Option<String>,
}

/// Account details served by the authenticated profile endpoint.
///
/// Administrators carry `company`; drivers carry the license fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Fields a user may change on their profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overlay the set fields on `profile`.
    pub fn apply_to(&self, profile: &mut AccountProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            profile.phone = Some(phone.clone());
        }
        if let Some(address) = &self.address {
            profile.address = Some(address.clone());
        }
    }
}

/// Request/response contract of the auth backend.
///
/// Failures carry a human-readable message for the screen to show.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn login(&self, email: &str, password: &SecretString) -> Result<AuthResponse, AuthError>;

    async fn register_admin(&self, signup: &AdminSignup) -> Result<AuthResponse, AuthError>;

    async fn register_driver(&self, signup: &DriverSignup) -> Result<AuthResponse, AuthError>;

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// Profile of the signed-in user. Requires a stored session token.
    async fn fetch_profile(&self) -> Result<AccountProfile, AuthError>;

    /// Apply `update` and return the resulting profile.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AccountProfile, AuthError>;
}

/// Build the gateway selected by configuration.
pub fn create_gateway(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<Arc<dyn AuthGateway>, ConfigError> {
    match config.gateway {
        GatewayKind::Mock => {
            tracing::info!(delay_ms = config.mock_delay.as_millis() as u64, "Using mock auth gateway");
            Ok(Arc::new(MockGateway::new(config.mock_delay).with_store(store)))
        }
        GatewayKind::Http => {
            let base_url = config.api_url.clone().ok_or_else(|| ConfigError::MissingRequired {
                key: "FLEET_API_URL".to_string(),
                hint: "Set it to the auth API base URL when FLEET_GATEWAY=http".to_string(),
            })?;
            tracing::info!(%base_url, "Using HTTP auth gateway");
            let gateway = HttpGateway::new(base_url, config.gateway_timeout, store).map_err(|e| {
                ConfigError::InvalidValue {
                    key: "FLEET_API_URL".to_string(),
                    message: e.to_string(),
                }
            })?;
            Ok(Arc::new(gateway))
        }
    }
}
