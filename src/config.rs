//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_API_BASE;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum ConnectionQuality {
    Fast,
    #[default]
    Normal,
    Slow,
    VerySlow,
    Custom,
}

impl ConnectionQuality {
    pub const ALL: [ConnectionQuality; 5] = [
        ConnectionQuality::Fast,
        ConnectionQuality::Normal,
        ConnectionQuality::Slow,
        ConnectionQuality::VerySlow,
        ConnectionQuality::Custom,
    ];

    pub fn buffer_seconds(&self, custom: u32) -> u32 {
        match self {
            ConnectionQuality::Fast => 2,
            ConnectionQuality::Normal => 5,
            ConnectionQuality::Slow => 15,
            ConnectionQuality::VerySlow => 30,
            ConnectionQuality::Custom => custom,
        }
    }

    pub fn is_slow(&self) -> bool {
        matches!(self, ConnectionQuality::Slow | ConnectionQuality::VerySlow)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionQuality::Fast => "Fast",
            ConnectionQuality::Normal => "Normal",
            ConnectionQuality::Slow => "Slow",
            ConnectionQuality::VerySlow => "Very slow",
            ConnectionQuality::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub external_player: String,
    #[serde(default = "default_buffer")]
    pub buffer_seconds: u32,
    #[serde(default)]
    pub connection_quality: ConnectionQuality,
    #[serde(default = "default_true")]
    pub use_internal_player: bool,
    #[serde(default = "default_true")]
    pub hw_accel: bool,
    #[serde(default = "default_true")]
    pub single_window_mode: bool,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default = "default_true")]
    pub pass_user_agent_to_player: bool,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_api_base() -> String { DEFAULT_API_BASE.to_string() }
fn default_timeout() -> u64 { 60 }
fn default_buffer() -> u32 { 5 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_secs: 60,
            external_player: String::new(),
            buffer_seconds: 5,
            connection_quality: ConnectionQuality::Normal,
            use_internal_player: true,
            hw_accel: true,
            single_window_mode: true,
            user_agent: String::new(),
            pass_user_agent_to_player: true,
            dark_mode: true,
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("iptv_catalog");
        path.push("config.json");
        path
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`; a missing or unreadable file yields the defaults
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn save(&self) -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn effective_buffer(&self) -> u32 {
        self.connection_quality.buffer_seconds(self.buffer_seconds)
    }
}
