//! Twilio Provider implementation
//!
//! Direct REST binding for the Programmable Messaging message list

use super::{MessageProvider, ProviderReply};
use crate::config::ProviderConfig;
use crate::models::Credentials;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Twilio API version segment
const API_VERSION: &str = "2010-04-01";

/// Twilio Provider
pub struct TwilioProvider {
    client: Client,
    base_url: String,
}

impl TwilioProvider {
    /// Create a new provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("otpinject/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the message list URL for an account
    fn build_url(&self, account_id: &str) -> String {
        format!("{}/{}/Accounts/{}/Messages.json", self.base_url, API_VERSION, account_id)
    }
}

#[async_trait]
impl MessageProvider for TwilioProvider {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn list_messages(&self, credentials: &Credentials, page_size: u32) -> Result<ProviderReply> {
        let url = self.build_url(&credentials.account_id);
        let page_size = page_size.to_string();
        debug!("Requesting message list: {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&credentials.account_id, Some(&credentials.auth_secret))
            .query(&[
                ("From", credentials.sender.as_str()),
                ("To", credentials.recipient.as_str()),
                ("PageSize", page_size.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read provider response")?;

        Ok(ProviderReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let provider = TwilioProvider::new(&ProviderConfig {
            base_url: "https://api.twilio.com/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            provider.build_url("AC123"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
