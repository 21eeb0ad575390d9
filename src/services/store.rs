//! Settings persistence
//!
//! Flat key-value string store backing credentials and the injection rule

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

pub const KEY_ACCOUNT_SID: &str = "accountSid";
pub const KEY_AUTH_TOKEN: &str = "authToken";
pub const KEY_FROM_NUMBER: &str = "fromNumber";
pub const KEY_TO_NUMBER: &str = "toNumber";
pub const KEY_RULE_TYPE: &str = "ruleType";
pub const KEY_PARAMETER_NAME: &str = "parameterName";

/// Key-value string store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Durable write. Callers treat it as fire-and-forget and only log failures.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Write and log on failure
    fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.set(key, value) {
            warn!("Failed to persist setting '{}': {:#}", key, e);
        }
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON file store
///
/// The whole file is a flat string object and is rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, reading existing values. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file: {:?}", path))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse settings file: {:?}", path))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened settings store {:?} with {} keys", path, values.len());
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }
        let content = serde_json::to_string_pretty(values).context("Failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings file: {:?}", self.path))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }
}
