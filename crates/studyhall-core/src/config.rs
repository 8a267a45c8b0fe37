//! Client configuration management.
//!
//! Configuration is stored at `~/.config/studyhall/config.json`. The
//! identity service URL can be overridden with the `STUDYHALL_SERVICE_URL`
//! environment variable, which takes precedence over the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "studyhall";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default identity service base URL
const DEFAULT_SERVICE_URL: &str = "https://api.studyhall.app";

/// Environment variable overriding the service URL
const SERVICE_URL_ENV: &str = "STUDYHALL_SERVICE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service_url: String,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            config.service_url = url;
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
