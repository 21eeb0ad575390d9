//! Provider credentials
//!
//! The serde form doubles as the settings import/export document.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Twilio account credentials and the phone numbers to filter on
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account SID
    #[serde(rename = "accountSid", default)]
    pub account_id: String,
    /// Auth token
    #[serde(rename = "authToken", default)]
    pub auth_secret: String,
    /// Number the OTP is sent from
    #[serde(rename = "fromNumber", default)]
    pub sender: String,
    /// Number the OTP is sent to
    #[serde(rename = "toNumber", default)]
    pub recipient: String,
}

impl Credentials {
    pub fn new(
        account_id: impl Into<String>,
        auth_secret: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            auth_secret: auth_secret.into(),
            sender: sender.into(),
            recipient: recipient.into(),
        }
    }

    /// Names of the fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("accountSid", &self.account_id),
            ("authToken", &self.auth_secret),
            ("fromNumber", &self.sender),
            ("toNumber", &self.recipient),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Parse an import document. Missing keys become empty strings.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse credentials document")
    }

    /// Pretty-printed export document
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize credentials")
    }

    pub fn import_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        Self::from_json(&content)
    }

    pub fn export_file(&self, path: &Path) -> Result<()> {
        let content = self.to_json_pretty()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {:?}", path))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("auth_secret", &"<redacted>")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields() {
        let credentials = Credentials::new("AC1", "", "+1555", " ");
        assert_eq!(credentials.missing_fields(), vec!["authToken", "toNumber"]);
        assert!(!credentials.is_complete());
        assert!(Credentials::new("AC1", "t", "+1", "+2").is_complete());
    }

    #[test]
    fn test_import_tolerates_missing_keys() {
        let credentials = Credentials::from_json(r#"{"accountSid":"AC1"}"#).unwrap();
        assert_eq!(credentials.account_id, "AC1");
        assert_eq!(credentials.auth_secret, "");
        assert_eq!(credentials.recipient, "");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = Credentials::new("AC1", "hunter2", "+1", "+2");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("AC1"));
    }
}
