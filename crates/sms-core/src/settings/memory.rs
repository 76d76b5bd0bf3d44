// # Memory Settings Store
//
// In-memory implementation of SettingsStore.
//
// ## Purpose
//
// Provides a simple, fast settings store that doesn't persist across
// restarts. Useful for tests and for deployments where the provider
// configuration is seeded from the environment on every start.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use async_trait::async_trait;

use crate::Error;
use crate::traits::settings_store::{AdminSettings, SettingsScope, SettingsStore};

/// In-memory settings store implementation
///
/// Records are held in a HashMap keyed by (scope, key) behind an async
/// RwLock. No persistence across restarts.
///
/// # Example
///
/// ```rust,no_run
/// use sms_core::{AdminSettings, MemorySettingsStore, SettingsScope, SettingsStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySettingsStore::new();
///
///     let record = AdminSettings::new("sms", serde_json::json!({"type": "twilio"}));
///     store.save(&SettingsScope::System, record).await?;
///
///     let found = store.find_by_key(&SettingsScope::System, "sms").await?;
///     assert!(found.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    inner: Arc<RwLock<HashMap<(SettingsScope, String), AdminSettings>>>,
}

impl MemorySettingsStore {
    /// Create a new empty memory settings store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clear all records from the store
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn find_by_key(
        &self,
        scope: &SettingsScope,
        key: &str,
    ) -> Result<Option<AdminSettings>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(&(scope.clone(), key.to_string())).cloned())
    }

    async fn save(&self, scope: &SettingsScope, settings: AdminSettings) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert((scope.clone(), settings.key.clone()), settings);
        Ok(())
    }

    async fn delete(&self, scope: &SettingsScope, key: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(&(scope.clone(), key.to_string()));
        Ok(())
    }
}
