use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity carried inside a token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUser {
    pub id: Uuid,
}

/// Token payload: `{ "user": { "id": ... }, "iat": ..., "exp": ... }`.
///
/// The nested `user` object is load-bearing; deployed clients decode tokens
/// with exactly this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user: TokenUser,
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}
