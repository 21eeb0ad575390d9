//! Settings handlers
//!
//! Credential and injection rule management

use crate::handlers::AppState;
use crate::models::{Credentials, RuleView};
use crate::utils::error::{AppError, AppResult, ErrorContext, RewriteError};
use crate::utils::logging::mask;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Credential state without the secret
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsStatus {
    pub configured: bool,
    pub missing: Vec<String>,
    #[serde(rename = "accountSid")]
    pub account_sid: String,
}

impl From<&Credentials> for CredentialsStatus {
    fn from(credentials: &Credentials) -> Self {
        let missing: Vec<String> = credentials
            .missing_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            configured: missing.is_empty(),
            missing,
            account_sid: mask(&credentials.account_id),
        }
    }
}

/// PUT /v1/credentials
pub async fn update_credentials(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Json<CredentialsStatus> {
    let snapshot = state.credentials.update(credentials);
    Json(CredentialsStatus::from(snapshot.as_ref()))
}

/// DELETE /v1/credentials
pub async fn clear_credentials(State(state): State<Arc<AppState>>) -> Json<CredentialsStatus> {
    let snapshot = state.credentials.clear();
    Json(CredentialsStatus::from(snapshot.as_ref()))
}

/// GET /v1/credentials/export
///
/// Pretty-printed export document, same format as the file export
pub async fn export_credentials(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let document = state.credentials.snapshot().to_json_pretty()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], document).into_response())
}

/// POST /v1/credentials/import
///
/// Missing keys import as empty strings
pub async fn import_credentials(
    State(state): State<Arc<AppState>>,
    body: String,
) -> AppResult<Json<CredentialsStatus>> {
    let credentials = Credentials::from_json(&body).validation_context("Invalid settings document")?;
    let snapshot = state.credentials.update(credentials);
    Ok(Json(CredentialsStatus::from(snapshot.as_ref())))
}

/// GET /v1/rule
pub async fn get_rule(State(state): State<Arc<AppState>>) -> AppResult<Json<RuleView>> {
    state
        .rules
        .current()
        .map(|rule| Json(rule.view()))
        .ok_or_else(|| AppError::NotFound("no injection rule configured".to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRuleRequest {
    #[serde(rename = "ruleType")]
    pub rule_type: String,
    #[serde(rename = "parameterName")]
    pub parameter_name: String,
}

/// PUT /v1/rule
///
/// Saves then reloads; answers with the rule as loaded back from storage
pub async fn save_rule(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveRuleRequest>,
) -> AppResult<Json<RuleView>> {
    state
        .rules
        .save(&request.rule_type, &request.parameter_name)
        .map(|rule| Json(rule.view()))
        .ok_or_else(|| {
            AppError::Rewrite(RewriteError::InvalidRule(format!(
                "rule type '{}' with parameter '{}' is not a valid rule",
                request.rule_type, request.parameter_name
            )))
        })
}
