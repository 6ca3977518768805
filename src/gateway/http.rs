//! HTTP gateway: JSON requests against the auth API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::error::AuthError;
use crate::store::KeyValueStore;
use crate::store::keys;

use super::{AccountProfile, AdminSignup, AuthGateway, AuthResponse, DriverSignup, ProfileUpdate, Unit};

/// Talks to `{base_url}/auth/*` and `{base_url}/user/profile`. Attaches the
/// stored session token as a bearer credential when one exists.
pub struct HttpGateway {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
    store: Arc<dyn KeyValueStore>,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client,
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send `request`, attaching the stored session token as a bearer
    /// credential when there is one, and map non-2xx replies to errors.
    async fn send(&self, path: &str, mut request: reqwest::RequestBuilder) -> Result<reqwest::Response, AuthError> {
        match self.store.get(keys::TOKEN).await {
            Ok(Some(token)) => request = request.bearer_auth(token),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Could not read session token, sending unauthenticated"),
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(path, status = %status, "Auth API rejected request");
        Err(rejection(status, &body))
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response, AuthError> {
        self.send(path, self.client.post(self.url(path)).json(body)).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        let response = self.post(path, body).await?;
        parse_json(response).await
    }

    fn transport_error(&self, e: reqwest::Error) -> AuthError {
        if e.is_timeout() {
            AuthError::Timeout(self.timeout)
        } else {
            AuthError::Transport(e.to_string())
        }
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AuthError> {
    response
        .json::<T>()
        .await
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

/// Map a non-2xx reply to an error, preferring the API's own `message`.
fn rejection(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .filter(|m| !m.is_empty());

    match message {
        Some(message) => AuthError::Rejected(message),
        None if status == StatusCode::UNAUTHORIZED => AuthError::InvalidCredentials,
        None => AuthError::Rejected(format!("Request failed with status {status}")),
    }
}

fn password_json(password: &SecretString) -> serde_json::Value {
    serde_json::Value::String(password.expose_secret().to_string())
}

#[async_trait]
impl AuthGateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn login(&self, email: &str, password: &SecretString) -> Result<AuthResponse, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password_json(password),
        });
        self.post_json("/auth/login", &body).await
    }

    async fn register_admin(&self, signup: &AdminSignup) -> Result<AuthResponse, AuthError> {
        let (unit, branch) = match &signup.unit {
            Unit::Headquarters => ("headquarters", None),
            Unit::Branch(name) => ("branch", Some(name.as_str())),
        };
        let body = serde_json::json!({
            "name": signup.name,
            "email": signup.email,
            "password": password_json(&signup.password),
            "unit": unit,
            "branch": branch,
            "phone": signup.phone,
        });
        self.post_json("/auth/register/admin", &body).await
    }

    async fn register_driver(&self, signup: &DriverSignup) -> Result<AuthResponse, AuthError> {
        let body = serde_json::json!({
            "name": signup.name,
            "email": signup.email,
            "password": password_json(&signup.password),
            "phone": signup.phone,
            "license": signup.license,
            "licenseDueDate": signup.license_due_date,
            "address": signup.address,
        });
        self.post_json("/auth/register/driver", &body).await
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let body = serde_json::json!({ "email": email });
        self.post("/auth/forgot-password", &body).await?;
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<AccountProfile, AuthError> {
        let path = "/user/profile";
        let response = self.send(path, self.client.get(self.url(path))).await?;
        parse_json(response).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<AccountProfile, AuthError> {
        let path = "/user/profile";
        let response = self
            .send(path, self.client.put(self.url(path)).json(update))
            .await?;
        parse_json(response).await
    }
}
