//! Bootstrap sequencer: loads persisted state once at startup and picks the
//! first screen.

use std::sync::Arc;

use serde::Serialize;

use crate::error::StorageError;
use crate::session::SessionService;
use crate::session::state::{PersistedSession, SessionState};
use crate::store::KeyValueStore;
use crate::store::keys;
use crate::theme::ThemeService;

/// Where navigation should land after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Onboarding,
    Login,
    MainApp,
}

impl Route {
    /// Onboarding first, then login, then the app.
    pub fn for_session(session: &SessionState) -> Self {
        if !session.has_completed_onboarding {
            Route::Onboarding
        } else if !session.is_logged_in {
            Route::Login
        } else {
            Route::MainApp
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Onboarding => "onboarding",
            Self::Login => "login",
            Self::MainApp => "main_app",
        };
        write!(f, "{s}")
    }
}

/// Runs the startup pass against the store and both services.
pub struct Bootstrap {
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionService>,
    theme: Arc<ThemeService>,
}

impl Bootstrap {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        session: Arc<SessionService>,
        theme: Arc<ThemeService>,
    ) -> Self {
        Self {
            store,
            session,
            theme,
        }
    }

    /// Load everything and return the initial route.
    ///
    /// The eight reads run concurrently. A read that fails yields that
    /// field's default; the sequence itself never fails.
    pub async fn run(&self) -> Route {
        self.session.begin_loading().await;

        let (
            onboarding_completed,
            user_profile,
            is_logged_in,
            user_id,
            user_name,
            user_email,
            theme_type,
            custom_colors,
        ) = tokio::join!(
            self.read(keys::ONBOARDING_COMPLETED),
            self.read(keys::USER_PROFILE),
            self.read(keys::IS_LOGGED_IN),
            self.read(keys::USER_ID),
            self.read(keys::USER_NAME),
            self.read(keys::USER_EMAIL),
            self.read(keys::THEME_TYPE),
            self.read(keys::CUSTOM_COLORS),
        );

        let session = SessionState::from_persisted(PersistedSession {
            onboarding_completed,
            user_profile,
            is_logged_in,
            user_id,
            user_name,
            user_email,
        });
        let route = Route::for_session(&session);

        self.theme
            .apply_persisted(theme_type.as_deref(), custom_colors.as_deref())
            .await;
        self.session.finish_loading(session).await;

        tracing::info!(%route, "Bootstrap complete");
        route
    }

    async fn read(&self, key: &'static str) -> Option<String> {
        self.store
            .get(key)
            .await
            .unwrap_or_else(|e: StorageError| {
                tracing::warn!(key, error = %e, "Bootstrap read failed, using default");
                None
            })
    }
}
