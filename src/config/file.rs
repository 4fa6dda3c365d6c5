//! File-based configuration loading
//!
//! Loads client configuration from a JSON file

use super::settings::Configuration;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

impl Configuration {
    /// Load configuration from JSON file
    ///
    /// Keys are camelCase; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Configuration = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config JSON")?;

        debug!("Loaded configuration for {}", config.service_url);
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. ~/.config/apiconnector/apiconnector.json
    /// 2. ./apiconnector.json
    ///
    /// Returns error if no configuration file is found.
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("apiconnector").join("apiconnector.json");
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        let local_path = Path::new("apiconnector.json");
        if local_path.exists() {
            return Self::load(local_path);
        }

        anyhow::bail!(
            "Configuration file not found. Please create one at:\n\
             - ~/.config/apiconnector/apiconnector.json (recommended)\n\
             - ./apiconnector.json (current directory)"
        )
    }
}
