//! Request rewriter
//!
//! Writes an OTP into a request according to an injection rule.
//! Pure: the input request is never modified.

use crate::models::{Header, HttpRequest, InjectionRule, Parameter, ParameterType};
use crate::utils::error::RewriteError;
use regex::NoExpand;
use tracing::debug;

/// Apply `rule` to `request` with `otp`
///
/// Header and parameter rules update the first case-insensitive name match in
/// place, or append a new entry. The body rule replaces the first matcher hit
/// and fails when there is none.
pub fn apply(request: &HttpRequest, rule: &InjectionRule, otp: &str) -> Result<HttpRequest, RewriteError> {
    match rule {
        InjectionRule::Header { name } => Ok(upsert_header(request, name, otp)),
        InjectionRule::UrlParam { name } => Ok(upsert_parameter(request, ParameterType::Url, name, otp)),
        InjectionRule::Cookie { name } => Ok(upsert_parameter(request, ParameterType::Cookie, name, otp)),
        InjectionRule::BodyParam { name } => Ok(upsert_parameter(request, ParameterType::Body, name, otp)),
        InjectionRule::BodyRegex { name, matcher } => replace_in_body(request, name, matcher, otp),
    }
}

fn upsert_header(request: &HttpRequest, name: &str, otp: &str) -> HttpRequest {
    match request.header_position(name) {
        Some(index) => {
            debug!("Updating header '{}'", name);
            request.with_header_value(index, otp)
        }
        None => {
            debug!("Adding header '{}'", name);
            request.with_header(Header::new(name, otp))
        }
    }
}

fn upsert_parameter(request: &HttpRequest, kind: ParameterType, name: &str, otp: &str) -> HttpRequest {
    match request.parameter_position(kind, name) {
        Some(index) => {
            debug!("Updating {:?} parameter '{}'", kind, name);
            request.with_parameter_value(index, otp)
        }
        None => {
            debug!("Adding {:?} parameter '{}'", kind, name);
            request.with_parameter(Parameter::new(kind, name, otp))
        }
    }
}

fn replace_in_body(
    request: &HttpRequest,
    name: &str,
    matcher: &regex::Regex,
    otp: &str,
) -> Result<HttpRequest, RewriteError> {
    if !matcher.is_match(&request.body) {
        return Err(RewriteError::FieldNotFound(name.to_string()));
    }

    let replacement = format!("\"{}\":\"{}\"", name, otp);
    let body = matcher.replacen(&request.body, 1, NoExpand(&replacement));
    debug!("Updated request body with OTP for '{}'", name);

    Ok(request.with_body(body.into_owned()))
}
