use sha2::{Digest, Sha256};

/// Deterministic Gravatar URL for an email address.
///
/// Pure computation; the image itself is fetched by clients, never by this
/// service. Gravatar hashes the trimmed, lowercased address.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}
