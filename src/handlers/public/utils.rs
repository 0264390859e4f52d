// Credential and avatar helpers shared by the public account endpoints.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};

use crate::error::ApiError;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::server_error()
        })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Avatar URL derived from the email digest, with sensible size/rating
/// defaults and an identicon fallback.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    format!("https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm", hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_roundtrip() {
        let hash = hash_password("secure_password_123").unwrap();
        assert!(verify_password("secure_password_123", &hash));
        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn gravatar_is_case_and_whitespace_insensitive() {
        assert_eq!(gravatar_url(" Dev@Example.com "), gravatar_url("dev@example.com"));
        assert!(gravatar_url("dev@example.com").starts_with("https://www.gravatar.com/avatar/"));
    }
}
