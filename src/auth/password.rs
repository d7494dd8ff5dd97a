use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    #[error("password verification failed: {0}")]
    VerificationFailed(String),
}

/// Argon2id with a fresh random salt per call, so hashing the same password
/// twice yields different stored hashes.
fn hash_sync(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            PasswordError::HashingFailed(e.to_string())
        })
}

fn verify_sync(plain: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        PasswordError::VerificationFailed(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Hashing is CPU-bound, so it runs on the blocking pool and never stalls
/// sibling request tasks.
pub async fn hash(plain: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_sync(&plain))
        .await
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
}

pub async fn verify(plain: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_sync(&plain, &hash))
        .await
        .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_sync(password).expect("hashing should succeed");
        assert!(verify_sync(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_sync(password).expect("hashing should succeed");
        assert!(!verify_sync("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_sync("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, PasswordError::VerificationFailed(_)));
    }

    #[test]
    fn salting_makes_repeat_hashes_differ() {
        let password = "same-password-twice";
        let first = hash_sync(password).expect("first hash");
        let second = hash_sync(password).expect("second hash");

        assert_ne!(first, second);
        assert!(verify_sync(password, &first).expect("first verifies"));
        assert!(verify_sync(password, &second).expect("second verifies"));
    }

    #[tokio::test]
    async fn offloaded_hash_and_verify_roundtrip() {
        let hash = hash("off-thread".to_owned()).await.expect("hash");
        assert!(verify("off-thread".to_owned(), hash)
            .await
            .expect("verify"));
    }
}
