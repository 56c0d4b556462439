//! Per-user display preferences behind an injectable store.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Small,
    #[default]
    Normal,
    Large,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub text_size: TextSize,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesChanged {
    pub user_id: String,
    pub preferences: Preferences,
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored preferences, or the defaults for a user who never saved any.
    async fn get(&self, user_id: &str) -> Result<Preferences, AppError>;
    async fn set(&self, user_id: &str, preferences: Preferences) -> Result<(), AppError>;
    fn subscribe(&self) -> broadcast::Receiver<PreferencesChanged>;
}

pub struct MemorySettings {
    entries: RwLock<HashMap<String, Preferences>>,
    changes: broadcast::Sender<PreferencesChanged>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySettings {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            entries: RwLock::new(HashMap::new()),
            changes,
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get(&self, user_id: &str) -> Result<Preferences, AppError> {
        Ok(self.entries.read().await.get(user_id).cloned().unwrap_or_default())
    }

    async fn set(&self, user_id: &str, preferences: Preferences) -> Result<(), AppError> {
        self.entries
            .write()
            .await
            .insert(user_id.to_string(), preferences.clone());
        let _ = self.changes.send(PreferencesChanged {
            user_id: user_id.to_string(),
            preferences,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PreferencesChanged> {
        self.changes.subscribe()
    }
}

/// JSON file holding every user's preferences, rewritten on each change.
pub struct FileSettings {
    path: PathBuf,
    inner: MemorySettings,
}

impl FileSettings {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let inner = MemorySettings::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let stored: HashMap<String, Preferences> = serde_json::from_str(&text)
                    .map_err(|e| AppError::Config(format!("{} is not valid settings JSON: {}", path.display(), e)))?;
                info!("loaded preferences for {} users from {}", stored.len(), path.display());
                *inner.entries.write().await = stored;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("{} not found, starting with empty preferences", path.display());
            }
            Err(e) => {
                return Err(AppError::Config(format!("cannot read {}: {}", path.display(), e)));
            }
        }

        Ok(Self { path, inner })
    }

    async fn persist(&self) -> Result<(), AppError> {
        let text = {
            let entries = self.inner.entries.read().await;
            serde_json::to_string_pretty(&*entries).map_err(|e| {
                warn!("failed to serialize preferences: {}", e);
                AppError::InternalServerError
            })?
        };
        tokio::fs::write(&self.path, text).await.map_err(|e| {
            warn!("failed to write {}: {}", self.path.display(), e);
            AppError::InternalServerError
        })
    }
}

#[async_trait]
impl SettingsStore for FileSettings {
    async fn get(&self, user_id: &str) -> Result<Preferences, AppError> {
        self.inner.get(user_id).await
    }

    async fn set(&self, user_id: &str, preferences: Preferences) -> Result<(), AppError> {
        self.inner.set(user_id, preferences).await?;
        self.persist().await
    }

    fn subscribe(&self) -> broadcast::Receiver<PreferencesChanged> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_defaults_and_notifies() {
        let store = MemorySettings::new();
        let mut rx = store.subscribe();

        assert_eq!(store.get("u1").await.unwrap(), Preferences::default());

        let dark = Preferences {
            theme: Theme::Dark,
            text_size: TextSize::Large,
            avatar_url: None,
        };
        store.set("u1", dark.clone()).await.unwrap();

        assert_eq!(store.get("u1").await.unwrap(), dark);
        let change = rx.recv().await.unwrap();
        assert_eq!(change.user_id, "u1");
        assert_eq!(change.preferences.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_file_settings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = FileSettings::open(&path).await.unwrap();
        let prefs = Preferences {
            theme: Theme::Dark,
            text_size: TextSize::Small,
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
        };
        store.set("u2", prefs.clone()).await.unwrap();
        drop(store);

        let reopened = FileSettings::open(&path).await.unwrap();
        assert_eq!(reopened.get("u2").await.unwrap(), prefs);
        assert_eq!(reopened.get("someone-else").await.unwrap(), Preferences::default());
    }

    #[tokio::test]
    async fn test_file_settings_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(matches!(FileSettings::open(&path).await, Err(AppError::Config(_))));
    }
}
