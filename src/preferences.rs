//! Persisted "assistant enabled" preference

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Durable user preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Arm the wake detector at startup
    #[serde(default)]
    pub enabled: bool,
}

impl Preferences {
    /// Load from `path`; missing or unreadable files yield defaults
    #[must_use]
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(crate::Error::from)
            .and_then(|content| Ok(toml::from_str::<Self>(&content)?));

        match parsed {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid preferences, using defaults");
                Self::default()
            }
        }
    }

    /// Write to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string(self)?)?;
        tracing::debug!(path = %path.display(), enabled = self.enabled, "preferences saved");
        Ok(())
    }
}

/// Preferences bound to a file
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn load(&self) -> Preferences {
        Preferences::load(&self.path)
    }

    /// Persist the enabled flag
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn set_enabled(&self, enabled: bool) -> Result<Preferences> {
        let prefs = Preferences { enabled };
        prefs.save(&self.path)?;
        Ok(prefs)
    }
}
