//! JSON file settings adapter.
//!
//! Implements [`SettingsPort`] on a single pretty-printed JSON file.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash mid-save leaves the previous settings intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{SettingsError, SettingsPort};
use crate::config::LedSettings;

pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SettingsPort for JsonFileSettings {
    fn load(&self) -> Result<LedSettings, SettingsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(SettingsError::NotFound),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|e| SettingsError::Corrupted(e.to_string()))
    }

    fn save(&mut self, settings: &LedSettings) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| SettingsError::Corrupted(e.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        info!("settings saved to {}", self.path.display());
        Ok(())
    }
}
