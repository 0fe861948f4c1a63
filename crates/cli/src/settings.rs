use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use maskwatch_core::shared::constants::{
    DEFAULT_API_URL, INFERENCE_HEIGHT, INFERENCE_WIDTH, LIVE_JPEG_QUALITY, MUTE_DURATION,
    REQUEST_TIMEOUT, STATIC_JPEG_QUALITY, STATUS_POLL_INTERVAL,
};

/// Persistent defaults. Command-line flags override every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub inference_width: u32,
    pub inference_height: u32,
    pub live_jpeg_quality: u8,
    pub static_jpeg_quality: u8,
    /// 0 runs cycles back to back.
    pub live_interval_ms: u64,
    pub mute_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT.as_secs(),
            poll_interval_secs: STATUS_POLL_INTERVAL.as_secs(),
            inference_width: INFERENCE_WIDTH,
            inference_height: INFERENCE_HEIGHT,
            live_jpeg_quality: LIVE_JPEG_QUALITY,
            static_jpeg_quality: STATIC_JPEG_QUALITY,
            live_interval_ms: 0,
            mute_minutes: MUTE_DURATION.as_secs() / 60,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("MaskWatch").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or unreadable files yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
