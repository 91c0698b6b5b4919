//! Persisted theme preference.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use ytclip_models::Theme;

use crate::config::ClipperConfig;

pub type PreferenceResult<T> = Result<T, PreferenceError>;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value storage for the theme choice.
pub trait PreferenceStore: Send + Sync {
    /// Stored theme, `None` when nothing was saved yet.
    fn load_theme(&self) -> PreferenceResult<Option<Theme>>;

    fn save_theme(&self, theme: Theme) -> PreferenceResult<()>;
}

/// Startup theme: saved preference, then the OS hint, then light.
///
/// An unreadable store is treated as empty.
pub fn resolve_theme(store: &dyn PreferenceStore, prefers_dark: Option<bool>) -> Theme {
    let saved = match store.load_theme() {
        Ok(saved) => saved,
        Err(e) => {
            warn!("Failed to read theme preference: {}", e);
            None
        }
    };
    Theme::resolve(saved, prefers_dark)
}

/// On-disk preference document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPreferences {
    theme: Theme,
    updated_at: DateTime<Utc>,
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the configured `preferences_path`.
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use ytclip_workflow::{ClipperConfig, JsonFilePreferenceStore, PreferenceStore};
    ///
    /// let config = ClipperConfig::load();
    /// let store: Arc<dyn PreferenceStore> = Arc::new(JsonFilePreferenceStore::from_config(&config));
    /// ```
    pub fn from_config(config: &ClipperConfig) -> Self {
        Self::new(&config.preferences_path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn load_theme(&self) -> PreferenceResult<Option<Theme>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved preferences");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredPreferences = serde_json::from_str(&content)?;
        Ok(Some(stored.theme))
    }

    fn save_theme(&self, theme: Theme) -> PreferenceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let stored = StoredPreferences {
            theme,
            updated_at: Utc::now(),
        };
        std::fs::write(&self.path, serde_json::to_vec_pretty(&stored)?)?;
        debug!(path = %self.path.display(), theme = %theme, "Saved theme preference");
        Ok(())
    }
}

/// Process-local store, for hosts without persistent storage and for tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    theme: Mutex<Option<Theme>>,
    writes: Mutex<Vec<Theme>>,
}

impl MemoryPreferenceStore {
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme: Mutex::new(Some(theme)),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Every theme written, in order.
    pub fn writes(&self) -> Vec<Theme> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_theme(&self) -> PreferenceResult<Option<Theme>> {
        Ok(self.theme.lock().map(|t| *t).unwrap_or(None))
    }

    fn save_theme(&self, theme: Theme) -> PreferenceResult<()> {
        if let Ok(mut current) = self.theme.lock() {
            *current = Some(theme);
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(theme);
        }
        Ok(())
    }
}
