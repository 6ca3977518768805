//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Which auth gateway implementation to wire up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayKind {
    /// Canned accounts, simulated latency. Used while the backend is not live.
    Mock,
    /// JSON over HTTP against `api_url`.
    Http,
}

impl std::fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the libSQL file backing the key-value store.
    pub db_path: PathBuf,
    pub gateway: GatewayKind,
    /// Base URL of the auth API (required for the HTTP gateway).
    pub api_url: Option<String>,
    /// Per-request timeout for gateway calls.
    pub gateway_timeout: Duration,
    /// Simulated latency of the mock gateway.
    pub mock_delay: Duration,
    /// Email domain administrators must sign in with.
    pub corporate_domain: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/fleet-session.db"),
            gateway: GatewayKind::Mock,
            api_url: None,
            gateway_timeout: Duration::from_secs(15),
            mock_delay: Duration::from_millis(1000),
            corporate_domain: "borgnotransportes.com.br".to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from `FLEET_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("FLEET_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let gateway = match lookup("FLEET_GATEWAY").as_deref() {
            None | Some("mock") => GatewayKind::Mock,
            Some("http") => GatewayKind::Http,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "FLEET_GATEWAY".to_string(),
                    message: format!("expected \"mock\" or \"http\", got \"{other}\""),
                });
            }
        };

        let api_url = lookup("FLEET_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());
        if gateway == GatewayKind::Http && api_url.is_none() {
            return Err(ConfigError::MissingRequired {
                key: "FLEET_API_URL".to_string(),
                hint: "Set it to the auth API base URL when FLEET_GATEWAY=http".to_string(),
            });
        }

        let gateway_timeout = match lookup("FLEET_GATEWAY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("FLEET_GATEWAY_TIMEOUT_SECS", &raw)?),
            None => defaults.gateway_timeout,
        };

        let mock_delay = match lookup("FLEET_MOCK_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number("FLEET_MOCK_DELAY_MS", &raw)?),
            None => defaults.mock_delay,
        };

        let corporate_domain = lookup("FLEET_CORPORATE_DOMAIN")
            .map(|s| s.trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.corporate_domain);

        Ok(Self {
            db_path,
            gateway,
            api_url,
            gateway_timeout,
            mock_delay,
            corporate_domain,
        })
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{e}"),
    })
}
