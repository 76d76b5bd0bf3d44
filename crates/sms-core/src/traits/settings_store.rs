// # Settings Store Trait
//
// Defines the interface for the administrative settings records that hold
// the provider configuration.
//
// ## Purpose
//
// The dispatch service reads exactly one record: key `"sms"` in the
// system-wide scope. The store itself is a generic key-value surface so
// that other administrative settings can share it.
//
// ## Implementations
//
// - Memory: `MemorySettingsStore` (tests, ephemeral deployments)
// - File: `FileSettingsStore` (JSON file with atomic writes)
// - Future: SQL-backed stores

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scope of a settings record
///
/// The dispatch service always queries [`SettingsScope::System`]; the
/// tenant scope exists for embedders that partition settings per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsScope {
    /// System-wide (global) scope
    System,
    /// Per-tenant scope
    Tenant(String),
}

impl SettingsScope {
    /// Stable string form used as a storage key
    pub fn storage_key(&self) -> String {
        match self {
            SettingsScope::System => "system".to_string(),
            SettingsScope::Tenant(id) => format!("tenant:{id}"),
        }
    }
}

/// An administrative settings record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Settings key (e.g. "sms")
    pub key: String,
    /// Opaque JSON payload; for the SMS record, a serialized
    /// [`SmsProviderConfig`](crate::SmsProviderConfig)
    pub json_value: serde_json::Value,
    /// Timestamp of the last write
    pub last_updated: DateTime<Utc>,
}

impl AdminSettings {
    /// Create a settings record stamped with the current time
    pub fn new(key: impl Into<String>, json_value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            json_value,
            last_updated: Utc::now(),
        }
    }
}

/// Trait for settings store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Find a settings record by scope and key
    ///
    /// # Returns
    ///
    /// - `Ok(Some(AdminSettings))`: The record
    /// - `Ok(None)`: No record stored under this scope/key
    /// - `Err(Error)`: Storage error
    async fn find_by_key(
        &self,
        scope: &SettingsScope,
        key: &str,
    ) -> Result<Option<AdminSettings>, crate::Error>;

    /// Create or replace a settings record
    async fn save(
        &self,
        scope: &SettingsScope,
        settings: AdminSettings,
    ) -> Result<(), crate::Error>;

    /// Delete a settings record
    ///
    /// Deleting a missing record is not an error.
    async fn delete(&self, scope: &SettingsScope, key: &str) -> Result<(), crate::Error>;
}
