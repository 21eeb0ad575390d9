//! Provider module
//!
//! Defines the message provider trait and the Twilio REST binding

pub mod twilio;

use crate::models::Credentials;
use anyhow::Result;
use async_trait::async_trait;

/// Raw provider answer, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status
    pub reason: String,
    /// Response body text
    pub body: String,
}

/// Message log provider
///
/// One call is one network round-trip. Implementations only transport;
/// status handling and OTP extraction belong to the fetcher.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// List the most recent messages from `credentials.sender` to `credentials.recipient`
    async fn list_messages(&self, credentials: &Credentials, page_size: u32) -> Result<ProviderReply>;
}

pub use twilio::TwilioProvider;
