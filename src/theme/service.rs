//! ThemeService: owns the active variant and overrides, persists user choices.
//!
//! Persistence is best-effort: the in-memory palette changes first and a
//! failed write is logged, never returned. Readers never wait on store I/O.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::store::KeyValueStore;
use crate::store::keys;

use super::palette::{ColorOverrides, ThemePalette, ThemeVariant};

#[derive(Debug, Default)]
struct ThemeState {
    variant: ThemeVariant,
    overrides: ColorOverrides,
    loaded: bool,
}

/// Holds the active builtin variant plus overrides and exposes the effective palette.
pub struct ThemeService {
    store: Arc<dyn KeyValueStore>,
    state: RwLock<ThemeState>,
    /// Orders store writes. Never held together with `state`'s write lock.
    persist_lock: Mutex<()>,
}

impl ThemeService {
    /// Create a service showing the `light` palette until persisted state is applied.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: RwLock::new(ThemeState::default()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Effective palette: builtin for the active variant merged with overrides.
    pub async fn active_palette(&self) -> ThemePalette {
        let state = self.state.read().await;
        state.variant.palette().merged_with(&state.overrides)
    }

    pub async fn variant(&self) -> ThemeVariant {
        self.state.read().await.variant
    }

    pub async fn overrides(&self) -> ColorOverrides {
        self.state.read().await.overrides.clone()
    }

    /// Whether persisted state has been applied yet.
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Read the persisted variant and overrides and apply them.
    ///
    /// The bootstrap sequencer does its own reads and calls [`Self::apply_persisted`];
    /// this is for callers that only need the theme.
    pub async fn initialize(&self) {
        let (variant, overrides) = tokio::join!(
            self.store.get(keys::THEME_TYPE),
            self.store.get(keys::CUSTOM_COLORS),
        );
        let variant = variant.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read theme variant");
            None
        });
        let overrides = overrides.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read custom colors");
            None
        });
        self.apply_persisted(variant.as_deref(), overrides.as_deref())
            .await;
    }

    /// Apply raw persisted values. Unknown variants and malformed override
    /// JSON fall back to the defaults.
    pub async fn apply_persisted(&self, variant_raw: Option<&str>, overrides_raw: Option<&str>) {
        let variant = match variant_raw {
            Some(raw) => raw.parse::<ThemeVariant>().unwrap_or_else(|e| {
                tracing::warn!("Ignoring persisted theme: {}", e);
                ThemeVariant::default()
            }),
            None => ThemeVariant::default(),
        };

        let overrides = match overrides_raw {
            Some(raw) => serde_json::from_str::<ColorOverrides>(raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed custom colors: {}", e);
                ColorOverrides::default()
            }),
            None => ColorOverrides::default(),
        };

        let mut state = self.state.write().await;
        state.variant = variant;
        state.overrides = overrides;
        state.loaded = true;
        tracing::debug!(variant = %state.variant, "Theme loaded");
    }

    /// Switch the builtin variant and persist the choice.
    pub async fn set_variant(&self, variant: ThemeVariant) {
        self.state.write().await.variant = variant;
        tracing::info!(%variant, "Theme changed");

        let _persist = self.persist_lock.lock().await;
        let latest = self.state.read().await.variant;
        if let Err(e) = self.store.set(keys::THEME_TYPE, latest.as_str()).await {
            tracing::warn!(error = %e, "Failed to persist theme variant");
        }
    }

    /// Merge `partial` into the current overrides and persist the merged set.
    pub async fn set_overrides(&self, partial: ColorOverrides) {
        self.state.write().await.overrides.merge(partial);
        self.persist_overrides().await;
    }

    /// Drop every override, reverting to the pure builtin palette.
    pub async fn clear_overrides(&self) {
        self.state.write().await.overrides = ColorOverrides::default();
        self.persist_overrides().await;
    }

    /// Write whatever overrides are current once this caller's turn comes,
    /// so the stored record always converges on the in-memory one.
    async fn persist_overrides(&self) {
        let _persist = self.persist_lock.lock().await;
        let overrides = self.state.read().await.overrides.clone();

        let result = if overrides.is_empty() {
            self.store.remove(keys::CUSTOM_COLORS).await
        } else {
            match serde_json::to_string(&overrides) {
                Ok(json) => self.store.set(keys::CUSTOM_COLORS, &json).await,
                Err(e) => {
                    tracing::warn!("Failed to serialize custom colors: {}", e);
                    return;
                }
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist custom colors");
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::StorageError;
    use crate::store::MemoryStore;

    /// Store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read {
                key: key.to_string(),
                reason: "unavailable".into(),
            })
        }
        async fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                reason: "unavailable".into(),
            })
        }
        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::Remove {
                key: key.to_string(),
                reason: "unavailable".into(),
            })
        }
    }

    /// `MemoryStore` whose writes take a while.
    struct SlowStore {
        inner: MemoryStore,
        delay: std::time::Duration,
    }

    #[async_trait]
    impl KeyValueStore for SlowStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            tokio::time::sleep(self.delay).await;
            self.inner.set(key, value).await
        }
        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            tokio::time::sleep(self.delay).await;
            self.inner.remove(key).await
        }
    }

    fn service_with(store: &Arc<MemoryStore>) -> ThemeService {
        ThemeService::new(Arc::clone(store) as Arc<dyn KeyValueStore>)
    }

    #[tokio::test]
    async fn light_until_loaded() {
        let store = Arc::new(MemoryStore::with_entries([(keys::THEME_TYPE, "dark")]));
        let service = service_with(&store);

        assert!(!service.is_loaded().await);
        assert_eq!(service.active_palette().await, ThemeVariant::Light.palette());

        service.initialize().await;
        assert!(service.is_loaded().await);
        assert_eq!(service.variant().await, ThemeVariant::Dark);
        assert_eq!(service.active_palette().await, ThemeVariant::Dark.palette());
    }

    #[tokio::test]
    async fn set_variant_persists() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(&store);

        service.set_variant(ThemeVariant::HighContrast).await;
        assert_eq!(
            store.get(keys::THEME_TYPE).await.unwrap().as_deref(),
            Some("highContrast")
        );
        assert_eq!(service.active_palette().await.primary, "#ffff00");
    }

    #[tokio::test]
    async fn overrides_merge_and_persist() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(&store);

        service
            .set_overrides(ColorOverrides::default().with_primary("#101010"))
            .await;
        service
            .set_overrides(ColorOverrides::default().with_secondary("#202020"))
            .await;

        let palette = service.active_palette().await;
        assert_eq!(palette.primary, "#101010");
        assert_eq!(palette.secondary, "#202020");
        assert_eq!(palette.background, ThemeVariant::Light.palette().background);

        let raw = store.get(keys::CUSTOM_COLORS).await.unwrap().unwrap();
        let persisted: ColorOverrides = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, service.overrides().await);
    }

    #[tokio::test]
    async fn overrides_survive_variant_switch() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(&store);

        service
            .set_overrides(ColorOverrides::default().with_text_secondary("#999999"))
            .await;
        service.set_variant(ThemeVariant::Dark).await;

        let palette = service.active_palette().await;
        assert_eq!(palette.text_secondary, "#999999");
        assert_eq!(palette.background, "#121212");
    }

    #[tokio::test]
    async fn clear_restores_builtin_for_every_variant() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(&store);

        for variant in ThemeVariant::ALL {
            service.set_variant(variant).await;
            service
                .set_overrides(
                    ColorOverrides::default()
                        .with_primary("#010101")
                        .with_secondary("#020202")
                        .with_text_secondary("#030303"),
                )
                .await;
            service.clear_overrides().await;

            assert_eq!(service.active_palette().await, variant.palette());
            assert_eq!(store.get(keys::CUSTOM_COLORS).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn bad_persisted_values_fall_back() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(&store);

        service
            .apply_persisted(Some("sepia"), Some("{not json"))
            .await;
        assert!(service.is_loaded().await);
        assert_eq!(service.variant().await, ThemeVariant::Light);
        assert!(service.overrides().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failures_do_not_block_memory() {
        let service = ThemeService::new(Arc::new(BrokenStore));

        service.initialize().await;
        assert!(service.is_loaded().await);

        service.set_variant(ThemeVariant::Dark).await;
        service
            .set_overrides(ColorOverrides::default().with_primary("#abcdef"))
            .await;
        assert_eq!(service.active_palette().await.primary, "#abcdef");
        assert_eq!(service.variant().await, ThemeVariant::Dark);

        service.clear_overrides().await;
        assert_eq!(service.active_palette().await, ThemeVariant::Dark.palette());
    }

    #[tokio::test]
    async fn readers_do_not_wait_for_slow_writes() {
        use std::time::{Duration, Instant};

        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            delay: Duration::from_millis(400),
        });
        let service = Arc::new(ThemeService::new(store.clone()));

        let writer = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.set_variant(ThemeVariant::Dark).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let started = Instant::now();
        let palette = service.active_palette().await;
        assert!(started.elapsed() < Duration::from_millis(100), "{:?}", started.elapsed());
        assert_eq!(palette, ThemeVariant::Dark.palette());

        writer.await.unwrap();
        assert_eq!(
            store.inner.get(keys::THEME_TYPE).await.unwrap().as_deref(),
            Some("dark")
        );
    }

    #[tokio::test]
    async fn overlapping_writes_store_the_latest_choice() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            delay: std::time::Duration::from_millis(30),
        });
        let service = Arc::new(ThemeService::new(store.clone()));

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.set_variant(ThemeVariant::Dark).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service.set_variant(ThemeVariant::HighContrast).await;
        first.await.unwrap();

        assert_eq!(service.variant().await, ThemeVariant::HighContrast);
        assert_eq!(
            store.inner.get(keys::THEME_TYPE).await.unwrap().as_deref(),
            Some("highContrast")
        );
    }
}
