//! Injection rule model
//!
//! Describes where in an outgoing request the OTP is written.

use crate::utils::error::RewriteError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule kind as stored in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    Header,
    UrlParam,
    Cookie,
    BodyParam,
    BodyRegex,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Header,
        RuleKind::UrlParam,
        RuleKind::Cookie,
        RuleKind::BodyParam,
        RuleKind::BodyRegex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Header => "HEADER",
            RuleKind::UrlParam => "URL_PARAM",
            RuleKind::Cookie => "COOKIE",
            RuleKind::BodyParam => "BODY_PARAM",
            RuleKind::BodyRegex => "BODY_REGEX",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = RewriteError;

    /// Exact match on the stored (uppercase) spelling. `URL` is the legacy name of `URL_PARAM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HEADER" => Ok(RuleKind::Header),
            "URL_PARAM" | "URL" => Ok(RuleKind::UrlParam),
            "COOKIE" => Ok(RuleKind::Cookie),
            "BODY_PARAM" => Ok(RuleKind::BodyParam),
            "BODY_REGEX" => Ok(RuleKind::BodyRegex),
            other => Err(RewriteError::InvalidRule(format!("unknown rule type '{}'", other))),
        }
    }
}

/// Where the OTP goes
///
/// Only `BodyRegex` carries a matcher; it is compiled once from the field name.
#[derive(Debug, Clone)]
pub enum InjectionRule {
    Header { name: String },
    UrlParam { name: String },
    Cookie { name: String },
    BodyParam { name: String },
    BodyRegex { name: String, matcher: Regex },
}

impl InjectionRule {
    /// Build a rule, compiling the body matcher for `BodyRegex`
    pub fn new(kind: RuleKind, field_name: impl Into<String>) -> Result<Self, RewriteError> {
        let name = field_name.into();
        if name.trim().is_empty() {
            return Err(RewriteError::InvalidRule("field name is empty".to_string()));
        }

        let rule = match kind {
            RuleKind::Header => InjectionRule::Header { name },
            RuleKind::UrlParam => InjectionRule::UrlParam { name },
            RuleKind::Cookie => InjectionRule::Cookie { name },
            RuleKind::BodyParam => InjectionRule::BodyParam { name },
            RuleKind::BodyRegex => {
                let matcher = body_matcher(&name)?;
                InjectionRule::BodyRegex { name, matcher }
            }
        };

        Ok(rule)
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            InjectionRule::Header { .. } => RuleKind::Header,
            InjectionRule::UrlParam { .. } => RuleKind::UrlParam,
            InjectionRule::Cookie { .. } => RuleKind::Cookie,
            InjectionRule::BodyParam { .. } => RuleKind::BodyParam,
            InjectionRule::BodyRegex { .. } => RuleKind::BodyRegex,
        }
    }

    pub fn field_name(&self) -> &str {
        match self {
            InjectionRule::Header { name }
            | InjectionRule::UrlParam { name }
            | InjectionRule::Cookie { name }
            | InjectionRule::BodyParam { name }
            | InjectionRule::BodyRegex { name, .. } => name,
        }
    }

    pub fn matcher(&self) -> Option<&Regex> {
        match self {
            InjectionRule::BodyRegex { matcher, .. } => Some(matcher),
            _ => None,
        }
    }

    pub fn view(&self) -> RuleView {
        RuleView {
            rule_type: self.kind(),
            parameter_name: self.field_name().to_string(),
            pattern: self.matcher().map(|m| m.as_str().to_string()),
        }
    }
}

/// Matcher for a JSON string member: `"<name>"\s*:\s*"(.*?)"`
fn body_matcher(name: &str) -> Result<Regex, RewriteError> {
    let pattern = format!(r#""{}"\s*:\s*"(.*?)""#, regex::escape(name));
    RegexBuilder::new(&pattern)
        .dot_matches_new_line(true)
        .multi_line(true)
        .build()
        .map_err(|e| RewriteError::InvalidRule(format!("cannot compile body matcher: {}", e)))
}

/// Serializable view of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleView {
    #[serde(rename = "ruleType")]
    pub rule_type: RuleKind,
    #[serde(rename = "parameterName")]
    pub parameter_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}
