//! Error handling tests

use axum::{http::StatusCode, response::IntoResponse};
use otpinject::utils::error::*;

fn otp_errors() -> Vec<(AppError, StatusCode, &'static str)> {
    vec![
        (
            AppError::Otp(OtpError::Configuration("missing: authToken".to_string())),
            StatusCode::PRECONDITION_FAILED,
            "configuration_error",
        ),
        (
            AppError::Otp(OtpError::Provider {
                status: 429,
                reason: "Too Many Requests".to_string(),
            }),
            StatusCode::BAD_GATEWAY,
            "provider_error",
        ),
        (
            AppError::Otp(OtpError::Transport(anyhow::anyhow!("connection reset"))),
            StatusCode::BAD_GATEWAY,
            "transport_error",
        ),
        (AppError::Otp(OtpError::NoOtpFound), StatusCode::NOT_FOUND, "no_otp_found_error"),
    ]
}

#[test]
fn test_app_error_status_codes() {
    let mut test_cases = otp_errors();
    test_cases.extend(vec![
        (
            AppError::Rewrite(RewriteError::FieldNotFound("otp".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY,
            "field_not_found_error",
        ),
        (
            AppError::Rewrite(RewriteError::InvalidRule("blank".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_rule_error",
        ),
        (
            AppError::Authentication("test".to_string()),
            StatusCode::UNAUTHORIZED,
            "authentication_error",
        ),
        (
            AppError::Validation("test".to_string()),
            StatusCode::BAD_REQUEST,
            "invalid_request_error",
        ),
        (AppError::NotFound("test".to_string()), StatusCode::NOT_FOUND, "not_found_error"),
        (
            AppError::Internal("test".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "api_error",
        ),
        (
            AppError::Config(anyhow::anyhow!("test")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "api_error",
        ),
    ]);

    for (error, expected_status, expected_type) in test_cases {
        assert_eq!(error.status_code(), expected_status, "{}", error);
        assert_eq!(error.error_type(), expected_type, "{}", error);
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(
        OtpError::Provider {
            status: 429,
            reason: "Too Many Requests".to_string()
        }
        .to_string(),
        "Provider error: 429 Too Many Requests"
    );
    assert_eq!(
        RewriteError::FieldNotFound("otp".to_string()).to_string(),
        "Field 'otp' not found in the request body"
    );
    assert_eq!(
        SessionError::from(OtpError::NoOtpFound).to_string(),
        "Failed to fetch OTP: No valid OTP found in recent messages"
    );
    assert_eq!(
        SessionError::MissingRule.to_string(),
        "Invalid configuration: no injection rule loaded"
    );

    // Transparent wrappers keep the inner message
    let error = AppError::from(RewriteError::InvalidRule("blank name".to_string()));
    assert_eq!(error.to_string(), "Invalid injection rule: blank name");
}

#[test]
fn test_should_log_details() {
    assert!(!AppError::Authentication("test".to_string()).should_log_details());

    assert!(AppError::Validation("test".to_string()).should_log_details());
    assert!(AppError::Internal("test".to_string()).should_log_details());
    assert!(AppError::Otp(OtpError::NoOtpFound).should_log_details());
}

#[test]
fn test_error_response_format() {
    let error = AppError::NotFound("no injection rule configured".to_string());
    let response = error.to_error_response();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["error"]["type"], "not_found_error");
    assert_eq!(
        json["error"]["message"],
        "Resource not found: no injection rule configured"
    );
}

#[tokio::test]
async fn test_into_response() {
    for (error, expected_status, expected_type) in otp_errors() {
        let message = error.to_string();
        let response = error.into_response();
        assert_eq!(response.status(), expected_status);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"]["type"], expected_type);
        assert_eq!(json["error"]["message"], message);
    }
}

#[test]
fn test_error_context() {
    let result: Result<(), &str> = Err("unexpected end of input");
    match result.validation_context("Invalid settings document") {
        Err(AppError::Validation(message)) => {
            assert_eq!(message, "Invalid settings document: unexpected end of input")
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    let result: Result<(), &str> = Err("task panicked");
    assert!(matches!(
        result.internal_context("Session action task failed"),
        Err(AppError::Internal(_))
    ));
}
