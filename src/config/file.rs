//! File-based configuration loading
//!
//! Loads server, provider, store and security configuration from a JSON file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host (default: "127.0.0.1" - localhost only)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default: 8090)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// SMS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for the provider API
    #[serde(rename = "baseUrl", default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Pause before each fetch, in milliseconds (0 disables)
    #[serde(rename = "fetchDelayMs", default)]
    pub fetch_delay_ms: u64,
}

fn default_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            fetch_delay_ms: 0,
        }
    }
}

/// Settings store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding credentials and the injection rule.
    /// Defaults to ~/.config/otpinject/settings.json; in-memory when no home directory exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolve_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::home_dir().map(|home| home.join(".config").join("otpinject").join("settings.json"))
        })
    }
}

/// Hook service access control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared key required on /v1 routes (disabled when absent)
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Header carrying the key
    #[serde(rename = "apiKeyHeader", default = "default_api_key_header")]
    pub api_key_header: String,
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_header: default_api_key_header(),
        }
    }
}

/// Application configuration loaded from JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config JSON")?;

        config.validate()?;

        debug!("Provider base URL: {}", config.provider.base_url);
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. `explicit` (from OTPINJECT_CONFIG), which must exist
    /// 2. ~/.config/otpinject/otpinject.json
    /// 3. ./otpinject.json
    ///
    /// Falls back to built-in defaults when no file is found.
    pub fn load_default(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(Path::new(path));
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("otpinject").join("otpinject.json");
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        let local_path = Path::new("otpinject.json");
        if local_path.exists() {
            return Self::load(local_path);
        }

        info!("No configuration file found, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if !self.provider.base_url.starts_with("http") {
            anyhow::bail!("Invalid provider base URL: {}", self.provider.base_url);
        }

        if self.provider.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.security.api_key_header.trim().is_empty() {
            anyhow::bail!("API key header cannot be empty");
        }

        if let Some(key) = &self.security.api_key {
            if key.trim().is_empty() {
                anyhow::bail!("API key cannot be empty when set");
            }
        }

        Ok(())
    }

    /// Listen address for the hook service
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
