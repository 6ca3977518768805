//! AuthFlow: what the login, signup, password-reset and profile screens run on submit.
//!
//! Each operation validates the form, calls the gateway under a timeout, and
//! on success hands the token to the session. Every error carries a message
//! fit for display.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::{AuthError, Result, ValidationError};
use crate::gateway::{AccountProfile, AdminSignup, AuthGateway, AuthResponse, DriverSignup, ProfileUpdate};
use crate::session::{SessionService, UserType};
use crate::validation;

/// Screen-level orchestration of authentication.
pub struct AuthFlow {
    gateway: Arc<dyn AuthGateway>,
    session: Arc<SessionService>,
    timeout: Duration,
    corporate_domain: String,
}

impl AuthFlow {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        session: Arc<SessionService>,
        timeout: Duration,
        corporate_domain: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            session,
            timeout,
            corporate_domain: corporate_domain.into(),
        }
    }

    /// Authenticate and start a session.
    ///
    /// Administrator accounts signing in with a non-corporate address are
    /// refused before any session state is written.
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<UserType> {
        validation::validate_login(email, password)?;

        let response = self.call(self.gateway.login(email, password)).await?;

        if response.user_type == UserType::Admin
            && !validation::is_corporate_email(email, &self.corporate_domain)
        {
            tracing::info!(email, "Admin sign-in with non-corporate email refused");
            return Err(ValidationError::CorporateEmailRequired {
                domain: self.corporate_domain.clone(),
            }
            .into());
        }

        self.start_session(&response, response.user_type).await?;
        Ok(response.user_type)
    }

    /// Register an administrator and sign them in. Also marks onboarding complete.
    pub async fn register_admin(&self, signup: &AdminSignup, confirmation: &SecretString) -> Result<()> {
        validation::validate_admin_signup(signup, confirmation, &self.corporate_domain)?;
        let response = self.call(self.gateway.register_admin(signup)).await?;
        self.start_session(&response, UserType::Admin).await?;
        self.finish_onboarding().await;
        Ok(())
    }

    /// Register a driver and sign them in. Also marks onboarding complete.
    pub async fn register_driver(&self, signup: &DriverSignup, confirmation: &SecretString) -> Result<()> {
        validation::validate_driver_signup(signup, confirmation)?;
        let response = self.call(self.gateway.register_driver(signup)).await?;
        self.start_session(&response, UserType::Driver).await?;
        self.finish_onboarding().await;
        Ok(())
    }

    /// Ask the backend to send password reset instructions.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        validation::validate_forgot_password(email)?;
        self.call(self.gateway.forgot_password(email)).await?;
        tracing::info!(email, "Password reset requested");
        Ok(())
    }

    /// Profile of the signed-in account.
    pub async fn fetch_profile(&self) -> Result<AccountProfile> {
        Ok(self.call(self.gateway.fetch_profile()).await?)
    }

    /// Send the changed fields and return the profile as the backend now has it.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<AccountProfile> {
        validation::validate_profile_update(update)?;
        let profile = self.call(self.gateway.update_profile(update)).await?;
        tracing::info!(user_id = %profile.id, "Profile updated");
        Ok(profile)
    }

    async fn call<T, F>(&self, fut: F) -> std::result::Result<T, AuthError>
    where
        F: Future<Output = std::result::Result<T, AuthError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.inspect_err(|e| {
                tracing::warn!(gateway = self.gateway.name(), error = %e, "Auth gateway call failed");
            }),
            Err(_) => {
                tracing::warn!(gateway = self.gateway.name(), timeout = ?self.timeout, "Auth gateway call timed out");
                Err(AuthError::Timeout(self.timeout))
            }
        }
    }

    async fn start_session(&self, response: &AuthResponse, user_type: UserType) -> Result<()> {
        self.session
            .login_with_user(&response.token, user_type, Some(&response.user))
            .await?;
        Ok(())
    }

    async fn finish_onboarding(&self) {
        if let Err(e) = self.session.complete_onboarding().await {
            tracing::warn!(error = %e, "Failed to mark onboarding complete after signup");
        }
    }
}
