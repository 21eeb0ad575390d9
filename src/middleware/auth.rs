//! Authentication middleware
//!
//! Optional shared-key check on the /v1 routes

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authentication middleware
///
/// Passes everything through when no key is configured.
pub async fn auth_middleware(
    State(state): State<Arc<crate::handlers::AppState>>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let security = &state.config.security;
    let expected = match security.api_key.as_deref() {
        Some(key) => key,
        None => return Ok(next.run(request).await),
    };

    debug!("Executing authentication middleware");

    let presented = headers
        .get(security.api_key_header.as_str())
        .and_then(|h| h.to_str().ok());

    match presented {
        Some(token) if validate_api_key(expected, token) => {
            debug!("Authentication successful");
            Ok(next.run(request).await)
        }
        Some(_) => {
            warn!("Invalid API key");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            warn!("Missing authentication header: {}", security.api_key_header);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Compare a presented key against the configured one
///
/// A `Bearer ` prefix on the presented value is ignored.
pub fn validate_api_key(expected: &str, presented: &str) -> bool {
    let token = presented.strip_prefix("Bearer ").unwrap_or(presented);
    if token.is_empty() || token.len() != expected.len() {
        return false;
    }

    // Compare every byte regardless of where the first mismatch is
    token
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
