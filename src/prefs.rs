//! Display preferences persisted to a JSON file
//!
//! Font sizes and other presentation knobs read by the rendering front end.
//! Updates are merged into the current preferences; keys the receiver does
//! not know about are kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ControllerError;

/// Presentation settings for the rendering front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPrefs {
    #[serde(default = "default_font_clock")]
    pub font_clock: String,
    #[serde(default = "default_font_date")]
    pub font_date: String,
    #[serde(default = "default_font_label")]
    pub font_label: String,
    #[serde(default = "default_font_event")]
    pub font_event: String,
    #[serde(default = "default_font_event_time")]
    pub font_event_time: String,
    #[serde(default = "default_font_weather_icon")]
    pub font_weather_icon: String,
    #[serde(default = "default_font_weather_temp")]
    pub font_weather_temp: String,
    #[serde(default = "default_font_dinner")]
    pub font_dinner: String,
    #[serde(default = "default_font_tasks")]
    pub font_tasks: String,
    /// Front-end specific settings the receiver passes through
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DisplayPrefs {
    fn default() -> Self {
        Self {
            font_clock: default_font_clock(),
            font_date: default_font_date(),
            font_label: default_font_label(),
            font_event: default_font_event(),
            font_event_time: default_font_event_time(),
            font_weather_icon: default_font_weather_icon(),
            font_weather_temp: default_font_weather_temp(),
            font_dinner: default_font_dinner(),
            font_tasks: default_font_tasks(),
            extra: Map::new(),
        }
    }
}

impl DisplayPrefs {
    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No display preferences at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Failed to read display preferences {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Ignoring invalid display preferences {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save preferences as pretty JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ControllerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).await?;
        Ok(())
    }

    /// Preferences with `patch` merged on top
    pub fn merged(&self, patch: Value) -> Result<Self, ControllerError> {
        let Value::Object(patch) = patch else {
            return Err(ControllerError::InvalidRequest(
                "Config body must be a JSON object".into(),
            ));
        };

        let mut current = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        current.extend(patch);

        serde_json::from_value(Value::Object(current))
            .map_err(|e| ControllerError::InvalidRequest(format!("Invalid config: {}", e)))
    }
}

/// Shared, persisted display preferences
pub struct PrefsStore {
    prefs: RwLock<DisplayPrefs>,
    path: PathBuf,
}

impl PrefsStore {
    /// Open the store, loading any saved preferences
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = DisplayPrefs::load(&path).await;
        info!("Display preferences loaded from {}", path.display());
        Self {
            prefs: RwLock::new(prefs),
            path,
        }
    }

    pub async fn get(&self) -> DisplayPrefs {
        self.prefs.read().await.clone()
    }

    /// Merge `patch`, persist, then publish the new preferences
    ///
    /// Nothing changes in memory when saving fails.
    pub async fn update(&self, patch: Value) -> Result<DisplayPrefs, ControllerError> {
        let mut prefs = self.prefs.write().await;
        let next = prefs.merged(patch)?;
        next.save(&self.path).await?;
        *prefs = next.clone();
        info!("Display preferences updated");
        Ok(next)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Default value functions
fn default_font_clock() -> String { "5rem".to_string() }
fn default_font_date() -> String { "1.4rem".to_string() }
fn default_font_label() -> String { "1.4rem".to_string() }
fn default_font_event() -> String { "2.8rem".to_string() }
fn default_font_event_time() -> String { "2rem".to_string() }
fn default_font_weather_icon() -> String { "2.8rem".to_string() }
fn default_font_weather_temp() -> String { "2.8rem".to_string() }
fn default_font_dinner() -> String { "2.2rem".to_string() }
fn default_font_tasks() -> String { "1.8rem".to_string() }

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_merge_keeps_unspecified_keys() {
        let prefs = DisplayPrefs::default();
        let merged = prefs
            .merged(json!({"font_clock": "7rem", "theme": "dark"}))
            .unwrap();
        assert_eq!(merged.font_clock, "7rem");
        assert_eq!(merged.font_tasks, "1.8rem");
        assert_eq!(merged.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_merge_rejects_non_object() {
        let err = DisplayPrefs::default().merged(json!(["font_clock"])).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_merge_rejects_wrongly_typed_known_key() {
        assert!(DisplayPrefs::default().merged(json!({"font_clock": 5})).is_err());
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let prefs = DisplayPrefs::load(temp.path().join("absent.json")).await;
        assert_eq!(prefs, DisplayPrefs::default());
    }

    #[tokio::test]
    async fn test_invalid_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prefs.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(DisplayPrefs::load(&path).await, DisplayPrefs::default());
    }

    #[tokio::test]
    async fn test_update_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("prefs.json");

        {
            let store = PrefsStore::open(&path).await;
            let updated = store
                .update(json!({"font_dinner": "3rem", "accent": "#ff0000"}))
                .await
                .unwrap();
            assert_eq!(updated.font_dinner, "3rem");
        }

        let store = PrefsStore::open(&path).await;
        let prefs = store.get().await;
        assert_eq!(prefs.font_dinner, "3rem");
        assert_eq!(prefs.font_clock, "5rem");
        assert_eq!(prefs.extra.get("accent"), Some(&json!("#ff0000")));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_prefs_untouched() {
        let temp = TempDir::new().unwrap();
        let store = PrefsStore::open(temp.path().join("prefs.json")).await;
        assert!(store.update(json!("oops")).await.is_err());
        assert_eq!(store.get().await, DisplayPrefs::default());
    }
}
