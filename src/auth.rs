//! Bearer-token authentication: password hashing and JWT mint/verify.
//!
//! Tokens are HS256-signed with a shared secret, carry the user id as the
//! subject, and expire after the configured lifetime (24 hours by default).
//! Passwords are hashed with Argon2id using a per-password random salt.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Claims carried in an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_hours: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_hours,
        }
    }

    /// Mint an access token for the given user.
    pub fn mint(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::hours(self.lifetime_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return the subject user id.
    ///
    /// Expired and malformed tokens both surface as `Unauthorized`; the
    /// distinction matters only for the message.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            },
        )?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Check a password against a stored hash. A malformed stored hash counts
/// as a failed verification rather than an error.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generate an astronaut identifier for accounts registered without one.
pub fn generate_astronaut_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("AST-{}", id[..4].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_subject() {
        let signer = TokenSigner::new("test-secret", 24);
        let user_id = Uuid::new_v4();
        let token = signer.mint(user_id).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", -1);
        let token = signer.mint(Uuid::new_v4()).unwrap();
        let err = signer.verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token expired"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let signer = TokenSigner::new("secret-a", 24);
        let other = TokenSigner::new("secret-b", 24);
        let token = signer.mint(Uuid::new_v4()).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("orbital-mechanics").unwrap();
        assert!(verify_password("orbital-mechanics", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn malformed_stored_hash_fails_verification() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn generated_astronaut_ids_have_expected_shape() {
        let id = generate_astronaut_id();
        assert!(id.starts_with("AST-"));
        assert_eq!(id.len(), 8);
        assert!(id[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
