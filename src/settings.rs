use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Detections at or above this confidence are parsed without a manual mapping.
    #[serde(default = "default_auto_accept_confidence")]
    pub auto_accept_confidence: u8,
    /// Rows shown in the data x-ray.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_auto_accept_confidence() -> u8 {
    70
}

fn default_sample_rows() -> usize {
    5
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_accept_confidence: default_auto_accept_confidence(),
            sample_rows: default_sample_rows(),
            log_level: default_log_level(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("folio")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    if settings.auto_accept_confidence > 100 {
        return Err(FolioError::Settings(format!(
            "auto-accept confidence must be 0-100, got {}",
            settings.auto_accept_confidence
        )));
    }
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FolioError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}
