//! Runtime configuration.
//! A small TOML file in the platform config directory, with every field
//! optional and an environment override for the task service URL.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{Error, Result};

const API_URL_ENV: &str = "DAYPLAN_API_URL";

fn default_api_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_reminder_lead_minutes() -> i64 {
    crate::services::reminder::DEFAULT_LEAD_MINUTES
}

fn default_poll_interval_secs() -> u64 {
    crate::services::reminder::POLL_PERIOD_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Minutes before a timed task at which its reminder fires.
    #[serde(default = "default_reminder_lead_minutes")]
    pub reminder_lead_minutes: i64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            reminder_lead_minutes: default_reminder_lead_minutes(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Config {
    /// Load from the platform config dir, falling back to defaults when no
    /// file exists. `DAYPLAN_API_URL` overrides the configured service URL.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path)?,
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_base_url = url;
        }
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("failed to read {}: {err}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|err| Error::Config(format!("failed to parse {}: {err}", path.display())))
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dayplan", "Dayplan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
