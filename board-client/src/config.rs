use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::validation::LengthLimits;

/// Client configuration stored in `~/.board/config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:8080`; `None` uses the default
    pub server_url: Option<String>,
    /// Bounds for new comment content, in characters
    pub comment_limits: LengthLimits,
    /// Minimum spacing between like/unlike requests
    pub like_throttle_ms: u64,
    /// Public address of the web front end, used for share links
    pub web_url: String,
    /// Share intent endpoint opened in the browser
    pub share_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            comment_limits: LengthLimits::new(5, 100),
            like_throttle_ms: 1000,
            web_url: "http://localhost:5173".to_string(),
            share_url: "https://twitter.com/intent/tweet".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn like_throttle(&self) -> Duration {
        Duration::from_millis(self.like_throttle_ms)
    }
}

/// Configuration manager for the .board directory
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for `~/.board`, creating the directory if needed
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Self::with_dir(home_dir.join(".board"))
    }

    /// Create a config manager rooted at an explicit directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create .board directory")?;
        }
        Ok(Self { config_dir })
    }

    fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Path of the stored JWT, next to the config file
    pub fn token_file(&self) -> PathBuf {
        self.config_dir.join("jwt")
    }

    /// Load the client configuration, or `None` if it has never been saved
    pub fn load(&self) -> Result<Option<ClientConfig>> {
        let config_file = self.config_file();
        if !config_file.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&config_file).context("Failed to read config file")?;
        let config: ClientConfig = serde_json::from_str(&json).context("Failed to parse config file")?;
        // Comments are never empty, so the lower bound is at least one
        if config.comment_limits.min_length == 0 || !config.comment_limits.is_valid() {
            anyhow::bail!(
                "Invalid comment limits in {}: min {}, max {}",
                config_file.display(),
                config.comment_limits.min_length,
                config.comment_limits.max_length
            );
        }
        Ok(Some(config))
    }

    /// Load the configuration, falling back to defaults when none is saved
    pub fn load_or_default(&self) -> Result<ClientConfig> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Save the client configuration
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(self.config_file(), json).context("Failed to write config file")?;
        Ok(())
    }
}
