//! Error handling module
//!
//! Defines error types and handling logic used in the project

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OTP retrieval errors
#[derive(Error, Debug)]
pub enum OtpError {
    /// Credentials incomplete, no request was sent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider answered with a non-200 status
    #[error("Provider error: {status} {reason}")]
    Provider { status: u16, reason: String },

    /// Network or response parsing failure
    #[error("Transport error: {0}")]
    Transport(#[source] anyhow::Error),

    /// No message, or no 4-6 digit run in the latest message
    #[error("No valid OTP found in recent messages")]
    NoOtpFound,
}

/// Request rewrite errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// Body matcher found nothing to replace
    #[error("Field '{0}' not found in the request body")]
    FieldNotFound(String),

    /// Rule cannot be applied as configured
    #[error("Invalid injection rule: {0}")]
    InvalidRule(String),
}

/// Why a session action fell back to the original request
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid configuration: no injection rule loaded")]
    MissingRule,

    #[error("Failed to fetch OTP: {0}")]
    Fetch(#[from] OtpError),

    #[error("Failed to inject OTP: {0}")]
    Rewrite(#[from] RewriteError),
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// OTP retrieval failed
    #[error(transparent)]
    Otp(#[from] OtpError),

    /// Rule or rewrite failure
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error body returned by the hook service
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Otp(OtpError::Configuration(_)) => StatusCode::PRECONDITION_FAILED,
            AppError::Otp(OtpError::Provider { .. }) | AppError::Otp(OtpError::Transport(_)) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Otp(OtpError::NoOtpFound) => StatusCode::NOT_FOUND,
            AppError::Rewrite(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Otp(OtpError::Configuration(_)) => "configuration_error",
            AppError::Otp(OtpError::Provider { .. }) => "provider_error",
            AppError::Otp(OtpError::Transport(_)) => "transport_error",
            AppError::Otp(OtpError::NoOtpFound) => "no_otp_found_error",
            AppError::Rewrite(RewriteError::FieldNotFound(_)) => "field_not_found_error",
            AppError::Rewrite(RewriteError::InvalidRule(_)) => "invalid_rule_error",
            AppError::Authentication(_) => "authentication_error",
            AppError::Validation(_) => "invalid_request_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::Config(_) | AppError::Internal(_) => "api_error",
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, AppError::Authentication(_))
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error_type: "error".to_string(),
            error: ErrorDetail {
                error_type: self.error_type().to_string(),
                message: self.to_string(),
            },
        }
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.should_log_details() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} - Status code: {}", self.error_type(), status);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add validation error context
    fn validation_context(self, message: &str) -> AppResult<T>;

    /// Add internal error context
    fn internal_context(self, message: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn validation_context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Validation(format!("{}: {}", message, e)))
    }

    fn internal_context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Internal(format!("{}: {}", message, e)))
    }
}
