use std::fs;
use std::path::Path;

use notebook_core::Error;
use serde::{Deserialize, Serialize};

/// Local client preferences. Only the theme choice is persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// None means "follow the system".
    #[serde(default)]
    pub dark_mode: Option<bool>,
}

impl Preferences {
    /// Load preferences, falling back to defaults if the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(self).map_err(|e| Error::Internal(e.to_string()))?;
        fs::write(path, text)
            .map_err(|e| Error::Internal(format!("Failed to write {}: {}", path.display(), e)))
    }

    pub fn effective_dark_mode(&self, system_default: bool) -> bool {
        self.dark_mode.unwrap_or(system_default)
    }
}
