// # File Settings Store
//
// File-based implementation of SettingsStore with crash recovery.
//
// ## Purpose
//
// Persists administrative settings across daemon restarts so the provider
// configuration survives a crash.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Corruption detection: JSON validation on load
// - Automatic backup: keeps a `.backup` of the last known good state and
//   falls back to it when the main file fails to parse
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "settings": {
//     "system": {
//       "sms": {
//         "key": "sms",
//         "json_value": { "type": "twilio", "...": "..." },
//         "last_updated": "2025-01-09T12:00:00Z"
//       }
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::settings_store::{AdminSettings, SettingsScope, SettingsStore};

/// Settings file format version, for future migrations
const SETTINGS_FILE_VERSION: &str = "1.0";

/// Scope storage key → settings key → record
type ScopedSettings = HashMap<String, HashMap<String, AdminSettings>>;

/// File-based settings store with atomic writes and backup recovery
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    settings: Arc<RwLock<ScopedSettings>>,
}

/// Serializable settings file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SettingsFileFormat {
    version: String,
    settings: ScopedSettings,
}

impl FileSettingsStore {
    /// Create or load a file settings store
    ///
    /// Loads the existing settings file if present, falling back to the
    /// `.backup` file on corruption, and starting empty when neither
    /// exists or parses. Parent directories are created as needed.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::settings_store(format!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let settings = Self::load_with_recovery(&path).await;

        Ok(Self {
            path,
            settings: Arc::new(RwLock::new(settings)),
        })
    }

    /// Load the settings file, recovering from backup on corruption
    async fn load_with_recovery(path: &Path) -> ScopedSettings {
        match Self::load(path).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "settings file {} unreadable ({}); trying backup",
                    path.display(),
                    e
                );
                let backup = Self::backup_path(path);
                match Self::load(&backup).await {
                    Ok(settings) => {
                        tracing::info!("recovered settings from backup {}", backup.display());
                        settings
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "backup also unreadable ({}); starting with empty settings",
                            backup_err
                        );
                        HashMap::new()
                    }
                }
            }
        }
    }

    async fn load(path: &Path) -> Result<ScopedSettings, Error> {
        if !path.exists() {
            tracing::debug!("settings file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::settings_store(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: SettingsFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::settings_store(format!(
                "Failed to parse settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        if file.version != SETTINGS_FILE_VERSION {
            tracing::warn!(
                "settings file version mismatch: expected {}, got {}; loading anyway",
                SETTINGS_FILE_VERSION,
                file.version
            );
        }

        Ok(file.settings)
    }

    /// Write the settings to disk atomically (temp file, backup, rename)
    async fn write(&self) -> Result<(), Error> {
        let file = {
            let guard = self.settings.read().await;
            SettingsFileFormat {
                version: SETTINGS_FILE_VERSION.to_string(),
                settings: guard.clone(),
            }
        };

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::settings_store(format!("Failed to serialize settings: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut temp = fs::File::create(&temp_path).await.map_err(|e| {
                Error::settings_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.write_all(json.as_bytes()).await.map_err(|e| {
                Error::settings_store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.flush().await.map_err(|e| {
                Error::settings_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("failed to create settings backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::settings_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("settings written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn find_by_key(
        &self,
        scope: &SettingsScope,
        key: &str,
    ) -> Result<Option<AdminSettings>, Error> {
        let guard = self.settings.read().await;
        Ok(guard
            .get(&scope.storage_key())
            .and_then(|records| records.get(key))
            .cloned())
    }

    async fn save(&self, scope: &SettingsScope, settings: AdminSettings) -> Result<(), Error> {
        {
            let mut guard = self.settings.write().await;
            guard
                .entry(scope.storage_key())
                .or_default()
                .insert(settings.key.clone(), settings);
        }

        // Immediate write for durability
        self.write().await
    }

    async fn delete(&self, scope: &SettingsScope, key: &str) -> Result<(), Error> {
        {
            let mut guard = self.settings.write().await;
            if let Some(records) = guard.get_mut(&scope.storage_key()) {
                records.remove(key);
            }
        }

        self.write().await
    }
}
