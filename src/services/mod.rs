//! Service layer module
//!
//! Contains settings stores, the OTP fetcher, the request rewriter and the session action

pub mod credentials;
pub mod fetcher;
pub mod rewriter;
pub mod rules;
pub mod session;
pub mod store;

pub use credentials::CredentialStore;
pub use fetcher::{extract_otp, OtpFetcher};
pub use rules::RuleStore;
pub use session::{SessionAction, SESSION_ACTION_NAME};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
