use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenUser};
use crate::state::AppState;

#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("token is expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(String),
}

/// Signs and verifies bearer tokens under a single shared secret.
///
/// Verification is stateless: possession of a token with a valid signature
/// and unexpired `exp` is the whole authorization check, with no store
/// round trip.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn sign(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            user: TokenUser { id: user_id },
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        debug!(user_id = %user_id, "token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        // A token is rejected the moment `exp` passes; no leeway.
        validation.leeway = 0;
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;
        debug!(user_id = %data.claims.user.id, "token verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self::new(
            &jwt.secret,
            Duration::from_secs(jwt.ttl_hours.max(0) as u64 * 3600),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::from_secs(100 * 3600))
    }

    fn encode_raw(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode")
    }

    #[test]
    fn sign_and_verify_returns_original_payload() {
        let tokens = service("dev-secret");
        let user_id = Uuid::new_v4();

        let token = tokens.sign(user_id).expect("sign");
        let claims = tokens.verify(&token).expect("verify");

        assert_eq!(claims.user.id, user_id);
        assert_eq!(claims.exp - claims.iat, 100 * 3600);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = service("secret-one").sign(Uuid::new_v4()).expect("sign");
        let err = service("secret-two").verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn verify_rejects_corrupted_token() {
        let tokens = service("dev-secret");
        let mut token = tokens.sign(Uuid::new_v4()).expect("sign");
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'B' } else { 'A' });

        let err = tokens.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));

        let err = tokens.verify("not-even-a-token").unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let tokens = service("dev-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            user: TokenUser { id: Uuid::new_v4() },
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
        };
        let token = encode_raw("dev-secret", &claims);

        let err = tokens.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn verify_accepts_token_within_ttl() {
        let tokens = TokenService::new("dev-secret", Duration::from_secs(60));
        let token = tokens.sign(Uuid::new_v4()).expect("sign");
        tokens.verify(&token).expect("still within ttl");
    }
}
