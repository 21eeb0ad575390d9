//! Twilio message list response

use serde::{Deserialize, Serialize};

/// `GET /2010-04-01/Accounts/{sid}/Messages.json` response (fields used here only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_sent: Option<String>,
}

impl MessageList {
    /// Body of the most recent message, if any
    pub fn latest_body(&self) -> Option<&str> {
        self.messages.first().map(|m| m.body.as_str())
    }
}
