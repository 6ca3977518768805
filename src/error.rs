//! Error types for the fleet session core.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Persistent key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Read failed for key {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Write failed for key {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Remove failed for key {key}: {reason}")]
    Remove { key: String, reason: String },
}

/// Rejections and failures coming from the remote auth gateway.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Rejected(String),

    #[error("user not authenticated")]
    NotAuthenticated,

    #[error("Auth gateway unreachable: {0}")]
    Transport(String),

    #[error("Auth gateway timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response from auth gateway: {0}")]
    InvalidResponse(String),
}

/// Client-side form checks that fail before anything reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields: {0} is required")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Administrators must use a corporate @{domain} email")]
    CorporateEmailRequired { domain: String },

    #[error("Please select the branch")]
    BranchRequired,

    #[error("Nothing to update")]
    EmptyUpdate,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
