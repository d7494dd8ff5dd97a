use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        service::Authenticator,
    },
    error::{ApiError, FieldError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_register(payload: &RegisterRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if payload.password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Please enter a password with 6 or more characters",
        ));
    }
    errors
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let errors = validate_register(&payload);
    if !errors.is_empty() {
        warn!(count = errors.len(), "register payload rejected");
        return Err(ApiError::Validation(errors));
    }

    let auth = Authenticator::from_ref(&state);
    let user = auth
        .register(&payload.name, &payload.email, &payload.password)
        .await?;
    let token = auth.issue_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut errors = Vec::new();
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::new("email", "Please include a valid email"));
    }
    if payload.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if !errors.is_empty() {
        warn!(count = errors.len(), "login payload rejected");
        return Err(ApiError::Validation(errors));
    }

    let auth = Authenticator::from_ref(&state);
    let token = auth.login(&payload.email, &payload.password).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip_all)]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .store
        .find_by_id(user_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        // Token outlived its user record; treat it like any other bad token.
        .ok_or(ApiError::InvalidToken)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("nora@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!is_valid_email("nora"));
        assert!(!is_valid_email("nora@"));
        assert!(!is_valid_email("nora@example"));
        assert!(!is_valid_email("no spaces@example.com"));
    }

    #[test]
    fn register_validation_collects_all_failures() {
        let errors = validate_register(&RegisterRequest {
            name: "  ".into(),
            email: "bad".into(),
            password: "short".into(),
        });
        assert_eq!(errors.len(), 3);

        let ok = validate_register(&RegisterRequest {
            name: "Nora".into(),
            email: "nora@example.com".into(),
            password: "hunter22".into(),
        });
        assert!(ok.is_empty());
    }
}
