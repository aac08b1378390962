use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Worker used when neither the config file nor the environment names one
pub const DEFAULT_WORKER_URL: &str = "https://my-chat-agent-v2.tonyabdelmalak.workers.dev";

/// Environment variable that overrides the configured worker URL
pub const WORKER_URL_ENV: &str = "REFLECTIV_WORKER_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATUS_INTERVAL_SECS: u64 = 5;
const DEFAULT_RETRY_DELAY_MS: u64 = 250;

/// User-editable settings persisted as JSON in the config directory
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub worker_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry_transient: Option<bool>,
    pub status_interval_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_worker_url(url: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.worker_url = Some(url.to_string());
        config.save()
    }

    /// Resolve the settings into a client configuration.
    ///
    /// `worker_url_override` wins over the file; callers pass the value of
    /// [`WORKER_URL_ENV`] here so the client itself never reads the environment.
    pub fn client_config(&self, worker_url_override: Option<&str>) -> ClientConfig {
        let base_url = worker_url_override
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.worker_url.clone())
            .unwrap_or_else(|| DEFAULT_WORKER_URL.to_string());

        ClientConfig {
            base_url,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            retry_transient: self.retry_transient.unwrap_or(true),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            status_interval: Duration::from_secs(
                self.status_interval_secs.unwrap_or(DEFAULT_STATUS_INTERVAL_SECS),
            ),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("reflectiv").join("config.json"))
    }
}

/// Everything the chat worker client needs, passed in explicitly at construction
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound on a single HTTP exchange
    pub timeout: Duration,
    /// Retry once after a connect error or timeout
    pub retry_transient: bool,
    pub retry_delay: Duration,
    pub status_interval: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Config::new().client_config(None)
    }
}
