//! Environment settings
//!
//! Process-level settings read from the environment (and `.env`)

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment-derived settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Explicit path of the JSON configuration file
    pub config_path: Option<String>,
    /// `DEV_MODE=true`
    #[serde(default)]
    pub dev_mode: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Settings {
    /// Create a new configuration instance
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
            config_path: std::env::var("OTPINJECT_CONFIG")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            dev_mode: std::env::var("DEV_MODE")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        // Plain levels only; per-target directives go through RUST_LOG as-is
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let is_directive = self.logging.level.contains('=') || self.logging.level.contains(',');
        if !is_directive && !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Check if in development mode
    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
