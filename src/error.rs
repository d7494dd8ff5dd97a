use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::auth::jwt::TokenError;
use crate::auth::service::AuthError;

/// A single field-level validation failure, in the shape existing clients
/// already parse: `{ "msg": ..., "param": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub msg: &'static str,
    pub param: &'static str,
}

impl FieldError {
    pub fn new(param: &'static str, msg: &'static str) -> Self {
        Self { msg, param }
    }
}

/// Application-level error for HTTP handlers.
///
/// Handlers return `Result<_, ApiError>`, so a failure and its response are
/// the same value and the response is rendered exactly once.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no token supplied")]
    MissingToken,

    #[error("token rejected")]
    InvalidToken,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser => ApiError::DuplicateUser,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            // Expired and invalid tokens are deliberately not told apart.
            AuthError::Token(TokenError::Expired) | AuthError::Token(TokenError::Invalid(_)) => {
                ApiError::InvalidToken
            }
            AuthError::Token(TokenError::Signing(detail)) => ApiError::Internal(detail),
            AuthError::Password(e) => ApiError::Internal(e.to_string()),
            AuthError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::DuplicateUser => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [{ "msg": "User already exists" }] })),
            )
                .into_response(),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [{ "msg": "Invalid credentials" }] })),
            )
                .into_response(),
            ApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "msg": "No token, authorization denied" })),
            )
                .into_response(),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "msg": "Token is not valid" })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                // Detail stays in the logs; the client sees an opaque 500.
                error!(error = %detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Vec<u8>) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn validation_error_reports_fields() {
        let (status, body) = render(ApiError::Validation(vec![FieldError::new(
            "email",
            "Please include a valid email",
        )]))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"][0]["param"], "email");
        assert_eq!(json["errors"][0]["msg"], "Please include a valid email");
    }

    #[tokio::test]
    async fn internal_error_is_opaque() {
        let (status, body) =
            render(ApiError::Internal("connection refused at 10.0.0.5".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Server error");
    }
}
