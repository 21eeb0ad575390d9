//! OTP injection library
//!
//! Fetches SMS one-time passcodes from Twilio and injects them into outgoing
//! HTTP requests through a session handling action

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{AppConfig, Settings};
pub use handlers::{create_router, AppState};
pub use models::{Credentials, HttpRequest, InjectionRule, RuleKind};
pub use services::{OtpFetcher, SessionAction, SESSION_ACTION_NAME};
pub use utils::error::{AppError, AppResult, OtpError, RewriteError, SessionError};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
