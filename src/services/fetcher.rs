//! OTP fetcher
//!
//! Pulls the latest message from the provider and extracts the passcode

use crate::models::twilio::MessageList;
use crate::providers::MessageProvider;
use crate::services::credentials::CredentialStore;
use crate::utils::error::OtpError;
use crate::utils::logging::{truncate_content, MAX_LOGGED_BODY_CHARS};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Standalone run of 4 to 6 digits
static OTP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{4,6}\b").expect("OTP pattern is valid"));

/// Only the most recent message is requested
const PAGE_SIZE: u32 = 1;

/// First 4-6 digit token in `body`, verbatim
pub fn extract_otp(body: &str) -> Option<&str> {
    OTP_PATTERN.find(body).map(|m| m.as_str())
}

/// Fetches OTPs using the live credential snapshot
#[derive(Clone)]
pub struct OtpFetcher {
    provider: Arc<dyn MessageProvider>,
    credentials: Arc<CredentialStore>,
    delay: Duration,
}

impl OtpFetcher {
    pub fn new(provider: Arc<dyn MessageProvider>, credentials: Arc<CredentialStore>) -> Self {
        Self {
            provider,
            credentials,
            delay: Duration::ZERO,
        }
    }

    /// Pause before every fetch; a courtesy toward the provider's rate limits
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetch the newest message and extract its OTP
    ///
    /// Exactly one provider call per invocation, none when credentials are incomplete.
    pub async fn fetch_latest_otp(&self) -> Result<String, OtpError> {
        let result = self.fetch_inner().await;
        match &result {
            Ok(otp) => info!("OTP retrieved: {}", otp),
            Err(e) => error!("Failed to retrieve OTP: {}", e),
        }
        result
    }

    async fn fetch_inner(&self) -> Result<String, OtpError> {
        let credentials = self.credentials.snapshot();
        let missing = credentials.missing_fields();
        if !missing.is_empty() {
            return Err(OtpError::Configuration(format!(
                "Twilio settings are not configured (missing: {})",
                missing.join(", ")
            )));
        }

        if !self.delay.is_zero() {
            debug!("Waiting {:?} before fetching", self.delay);
            tokio::time::sleep(self.delay).await;
        }

        info!("Fetching messages from {}...", self.provider.name());

        let reply = self
            .provider
            .list_messages(&credentials, PAGE_SIZE)
            .await
            .map_err(OtpError::Transport)?;

        if reply.status != 200 {
            error!("Failed to retrieve messages: {} {}", reply.status, reply.reason);
            return Err(OtpError::Provider {
                status: reply.status,
                reason: reply.reason,
            });
        }

        let list: MessageList = serde_json::from_str(&reply.body)
            .map_err(|e| OtpError::Transport(anyhow::Error::new(e).context("Failed to parse message list")))?;

        let body = list.latest_body().ok_or(OtpError::NoOtpFound)?;
        info!("Message retrieved: {}", truncate_content(body, MAX_LOGGED_BODY_CHARS));

        extract_otp(body)
            .map(str::to_string)
            .ok_or(OtpError::NoOtpFound)
    }
}
