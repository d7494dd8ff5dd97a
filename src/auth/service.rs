use std::sync::Arc;

use axum::extract::FromRef;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::avatar::gravatar_url;
use crate::auth::jwt::{TokenError, TokenService};
use crate::auth::password::{self, PasswordError};
use crate::auth::repo::{NewUser, StoreError, User, UserStore};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registration and login against an injected store and token service.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            tokens: TokenService::from_ref(state),
        }
    }
}

impl Authenticator {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if self.store.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let avatar = gravatar_url(email);
        let password_hash = password::hash(password.to_owned()).await?;

        let user = self
            .store
            .insert(NewUser {
                name: name.to_owned(),
                email: email.to_owned(),
                password_hash,
                avatar,
            })
            .await
            .map_err(|e| match e {
                // A concurrent registration won the race at the store.
                StoreError::DuplicateEmail => AuthError::DuplicateUser,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password both come back as
    /// `InvalidCredentials`, so registered addresses cannot be probed.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = password::verify(password.to_owned(), user.password_hash.clone()).await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.sign(user.id)?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        Ok(self.tokens.sign(user_id)?)
    }
}
