//! Session data model and load lifecycle.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::keys;

/// Which kind of account the device user has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Admin,
    Driver,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Driver => "driver",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "driver" => Ok(Self::Driver),
            other => Err(format!("unknown user type: {other}")),
        }
    }
}

/// Identity fields returned by the auth gateway and cached on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Load lifecycle of the session.
///
/// Progresses once per process: Uninitialized → Loading → Ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Uninitialized,
    Loading,
    Ready,
}

impl LoadPhase {
    pub fn can_transition_to(&self, target: LoadPhase) -> bool {
        matches!(
            (self, target),
            (LoadPhase::Uninitialized, LoadPhase::Loading) | (LoadPhase::Loading, LoadPhase::Ready)
        )
    }
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
        };
        write!(f, "{s}")
    }
}

/// Authentication and onboarding status of the device user.
///
/// `is_logged_in` implies `user_profile.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub is_logged_in: bool,
    pub user_profile: Option<UserType>,
    pub has_completed_onboarding: bool,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

/// Raw values as read from the store, one per persisted key.
#[derive(Debug, Clone, Default)]
pub struct PersistedSession {
    pub onboarding_completed: Option<String>,
    pub user_profile: Option<String>,
    pub is_logged_in: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl SessionState {
    /// Rebuild the session from persisted values.
    ///
    /// Unknown profile strings read as no profile. A logged-in flag without a
    /// valid profile is dropped so the invariant holds.
    pub fn from_persisted(raw: PersistedSession) -> Self {
        let user_profile = raw.user_profile.as_deref().and_then(|s| {
            s.parse::<UserType>()
                .map_err(|e| tracing::warn!("Ignoring persisted profile: {}", e))
                .ok()
        });

        let mut is_logged_in = keys::is_true(raw.is_logged_in.as_deref());
        if is_logged_in && user_profile.is_none() {
            tracing::warn!("Persisted session is logged in without a profile, treating as signed out");
            is_logged_in = false;
        }

        Self {
            is_logged_in,
            user_profile,
            has_completed_onboarding: keys::is_true(raw.onboarding_completed.as_deref()),
            user_id: raw.user_id,
            user_name: raw.user_name,
            user_email: raw.user_email,
        }
    }

    /// Forget the signed-in user. Onboarding completion is kept.
    pub fn clear_identity(&mut self) {
        self.is_logged_in = false;
        self.user_profile = None;
        self.user_id = None;
        self.user_name = None;
        self.user_email = None;
    }
}
