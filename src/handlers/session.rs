//! Session action handlers
//!
//! Entry points used by the proxy tool for each outgoing request

use crate::handlers::AppState;
use crate::models::HttpRequest;
use crate::utils::error::{AppResult, ErrorContext};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Handle a session action invocation
///
/// POST /v1/session-action
///
/// Always answers with a request; failures leave it unmodified and are only logged.
pub async fn handle_session_action(
    State(state): State<Arc<AppState>>,
    Json(request): Json<HttpRequest>,
) -> AppResult<Json<HttpRequest>> {
    debug!("Session action invoked for {} {}", request.method, request.path);

    let action = state.action.clone();
    let rewritten = tokio::task::spawn_blocking(move || action.perform(&request))
        .await
        .internal_context("Session action task failed")?;

    Ok(Json(rewritten))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OtpResponse {
    pub otp: String,
}

/// Fetch the latest OTP on demand
///
/// GET /v1/otp
pub async fn fetch_otp(State(state): State<Arc<AppState>>) -> AppResult<Json<OtpResponse>> {
    let otp = state.fetcher.fetch_latest_otp().await?;
    Ok(Json(OtpResponse { otp }))
}
