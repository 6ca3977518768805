//! Client-side form checks for the login, signup and password-reset screens.

use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ValidationError;
use crate::gateway::{AdminSignup, DriverSignup, ProfileUpdate, Unit};

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Whether `email` belongs to the corporate `domain`.
pub fn is_corporate_email(email: &str, domain: &str) -> bool {
    email
        .rsplit_once('@')
        .is_some_and(|(_, host)| host.eq_ignore_ascii_case(domain))
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_secret(value: &SecretString, field: &'static str) -> Result<(), ValidationError> {
    require(value.expose_secret(), field)
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

fn check_new_password(password: &SecretString, confirmation: &SecretString) -> Result<(), ValidationError> {
    if password.expose_secret() != confirmation.expose_secret() {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Login form: both fields present, email well-formed.
pub fn validate_login(email: &str, password: &SecretString) -> Result<(), ValidationError> {
    require(email, "email")?;
    require_secret(password, "password")?;
    check_email(email)
}

/// Password reset form.
pub fn validate_forgot_password(email: &str) -> Result<(), ValidationError> {
    require(email, "email")?;
    check_email(email)
}

/// Administrator signup form. Admins must use a corporate address.
pub fn validate_admin_signup(
    signup: &AdminSignup,
    confirmation: &SecretString,
    corporate_domain: &str,
) -> Result<(), ValidationError> {
    require(&signup.name, "name")?;
    require(&signup.email, "email")?;
    require_secret(&signup.password, "password")?;
    require_secret(confirmation, "password confirmation")?;
    require(&signup.phone, "phone")?;

    if !is_valid_email(&signup.email) || !is_corporate_email(&signup.email, corporate_domain) {
        return Err(ValidationError::CorporateEmailRequired {
            domain: corporate_domain.to_string(),
        });
    }
    if let Unit::Branch(name) = &signup.unit {
        if name.trim().is_empty() {
            return Err(ValidationError::BranchRequired);
        }
    }
    check_new_password(&signup.password, confirmation)
}

/// Driver signup form.
pub fn validate_driver_signup(signup: &DriverSignup, confirmation: &SecretString) -> Result<(), ValidationError> {
    require(&signup.name, "name")?;
    require(&signup.email, "email")?;
    require_secret(&signup.password, "password")?;
    require_secret(confirmation, "password confirmation")?;
    require(&signup.phone, "phone")?;
    require(&signup.license, "license")?;
    check_email(&signup.email)?;
    check_new_password(&signup.password, confirmation)
}

/// Profile edit form: at least one field set, no blanked name, email well-formed.
pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    if update.is_empty() {
        return Err(ValidationError::EmptyUpdate);
    }
    if let Some(name) = &update.name {
        require(name, "name")?;
    }
    if let Some(email) = &update.email {
        require(email, "email")?;
        check_email(email)?;
    }
    Ok(())
}
