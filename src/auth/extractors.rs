use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::TokenService;
use crate::error::ApiError;

/// Header clients send the bearer token in. Non-standard on purpose:
/// deployed clients already use it.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Extracts and verifies the bearer token, yielding the caller's user id.
///
/// Rejection short-circuits the handler, so an auth failure can never be
/// followed by a second response write. Expired and tampered tokens are
/// rejected identically.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::MissingToken)?;

        let tokens = TokenService::from_ref(state);
        let claims = tokens.verify(token).map_err(|e| {
            warn!(error = %e, "rejected token");
            ApiError::InvalidToken
        })?;

        Ok(AuthUser(claims.user.id))
    }
}
