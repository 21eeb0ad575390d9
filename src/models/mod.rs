//! Data models module
//!
//! Request representation, injection rules, credentials and provider payloads

pub mod credentials;
pub mod request;
pub mod rule;
pub mod twilio;

pub use credentials::Credentials;
pub use request::{Header, HttpRequest, Parameter, ParameterType};
pub use rule::{InjectionRule, RuleKind, RuleView};
