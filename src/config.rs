//! Configuration Management
//!
//! Handles persistent configuration storage for packload.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default host API address (the host's stock listen port)
const DEFAULT_BASE_URL: &str = "http://localhost:30000";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Host API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the host API
    #[serde(default)]
    pub token: Option<String>,
    /// Last imported pack
    #[serde(default)]
    pub last_pack: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("packload").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective base URL (CLI > config > env > default)
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| std::env::var("PACKLOAD_HOST").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get effective token (CLI > config > env)
    pub fn effective_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("PACKLOAD_TOKEN").ok())
    }

    /// Remember the last imported pack and save
    pub fn set_last_pack(&mut self, pack: &str) -> Result<()> {
        self.last_pack = Some(pack.to_string());
        self.save()
    }
}
