//! Health check handlers
//!
//! Provides application health status check endpoints

use crate::handlers::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service name
    pub service: String,
    /// Version information
    pub version: String,
    /// Timestamp
    pub timestamp: String,
    /// Details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// Check result
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDetails {
    /// "configured", or the missing credential keys
    pub credentials: String,
    /// Loaded rule, e.g. "HEADER X-OTP", or "not_configured"
    pub rule: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Whether DEV_MODE is on
    pub dev_mode: bool,
}

/// Record the service start time; later calls are no-ops
pub fn mark_started() {
    START_TIME.get_or_init(Instant::now);
}

fn get_uptime_seconds() -> u64 {
    START_TIME.get_or_init(Instant::now).elapsed().as_secs()
}

fn details(state: &AppState) -> (bool, HealthDetails) {
    let missing = state.credentials.snapshot().missing_fields();
    let rule = state.rules.current();
    let ready = missing.is_empty() && rule.is_some();

    let details = HealthDetails {
        credentials: if missing.is_empty() {
            "configured".to_string()
        } else {
            format!("missing: {}", missing.join(", "))
        },
        rule: rule
            .map(|r| format!("{} {}", r.kind(), r.field_name()))
            .unwrap_or_else(|| "not_configured".to_string()),
        uptime_seconds: get_uptime_seconds(),
        dev_mode: state.settings.is_dev_mode(),
    };

    (ready, details)
}

fn response(status: &str, details: Option<HealthDetails>) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        service: "otpinject".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        details,
    }
}

/// Basic health check
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!("Executing health check");
    let (_, details) = details(&state);
    Json(response("healthy", Some(details)))
}

/// Readiness check
///
/// GET /health/ready
/// Ready once credentials are complete and an injection rule is loaded
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    debug!("Executing readiness check");

    let (ready, details) = details(&state);
    if ready {
        Ok(Json(response("ready", Some(details))))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response("not_ready", Some(details)))))
    }
}

/// Liveness check
///
/// GET /health/live
pub async fn liveness_check() -> Json<HealthResponse> {
    debug!("Executing liveness check");
    Json(response("alive", None))
}
