//! AppContext: explicitly constructed services handed to the navigation root.

use std::sync::Arc;

use crate::auth::AuthFlow;
use crate::bootstrap::{Bootstrap, Route};
use crate::config::AppConfig;
use crate::error::Result;
use crate::gateway::{self, AuthGateway};
use crate::session::SessionService;
use crate::store::{KeyValueStore, LibSqlStore};
use crate::theme::ThemeService;

/// Everything a screen may touch: read snapshots via the services, mutations
/// via their methods.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn KeyValueStore>,
    pub session: Arc<SessionService>,
    pub theme: Arc<ThemeService>,
    pub auth: Arc<AuthFlow>,
}

impl AppContext {
    /// Wire services around an existing store and gateway.
    pub fn new(config: &AppConfig, store: Arc<dyn KeyValueStore>, gateway: Arc<dyn AuthGateway>) -> Self {
        let session = Arc::new(SessionService::new(Arc::clone(&store)));
        let theme = Arc::new(ThemeService::new(Arc::clone(&store)));
        let auth = Arc::new(AuthFlow::new(
            gateway,
            Arc::clone(&session),
            config.gateway_timeout,
            config.corporate_domain.clone(),
        ));
        Self {
            store,
            session,
            theme,
            auth,
        }
    }

    /// Open the on-disk store and build the configured gateway.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(LibSqlStore::new_local(&config.db_path).await?);
        let gateway = gateway::create_gateway(config, Arc::clone(&store))?;
        Ok(Self::new(config, store, gateway))
    }

    /// Run the startup pass once and return the initial route.
    pub async fn bootstrap(&self) -> Route {
        Bootstrap::new(
            Arc::clone(&self.store),
            Arc::clone(&self.session),
            Arc::clone(&self.theme),
        )
        .run()
        .await
    }
}
