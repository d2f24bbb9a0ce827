use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access tokens outlive the request but not the half hour, unless
/// overridden via `TOKEN_TTL_MINUTES`.
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    TokenInvalid,
    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("token signing error: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// subject: the username the token was issued to
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Password hashing and bearer-token issue/verify. The signing key is fixed
/// at startup; rotating it invalidates every outstanding token.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(secret: &str, ttl_minutes: i64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
            bcrypt_cost,
        }
    }

    pub fn new_from_env() -> Self {
        let secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);

        Self::new(&secret, ttl_minutes, bcrypt::DEFAULT_COST)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.bcrypt_cost)?)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(bcrypt::verify(password, hash)?)
    }

    /// Hash and discard, so the missing-user login path costs the same as a
    /// wrong-password one.
    pub fn burn_password(&self, password: &str) {
        let _ = bcrypt::hash(password, self.bcrypt_cost);
    }

    /// Signed HS256 token with `sub = username` and a fixed-TTL expiry.
    pub fn issue_token(&self, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.ttl_minutes);
        let claims = Claims {
            sub: username.to_owned(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Encode)
    }

    /// Stateless verification; resolves the token back to its username.
    pub fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        let data =
            decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenInvalid,
                }
            })?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // low bcrypt cost to keep the suite fast; production uses DEFAULT_COST
    fn service() -> AuthService {
        AuthService::new("test-secret", 30, 4)
    }

    #[test]
    fn password_hash_round_trip() {
        let svc = service();
        let hash = svc.hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(svc.verify_password("hunter2", &hash).unwrap());
        assert!(!svc.verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn password_hashes_are_salted() {
        let svc = service();
        let a = svc.hash_password("same-password").unwrap();
        let b = svc.hash_password("same-password").unwrap();
        assert_ne!(a, b);
        assert!(svc.verify_password("same-password", &a).unwrap());
        assert!(svc.verify_password("same-password", &b).unwrap());
    }

    #[test]
    fn token_round_trip_returns_subject() {
        let svc = service();
        let token = svc.issue_token("alice").unwrap();
        assert_eq!(svc.verify_token(&token).unwrap(), "alice");
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        // negative TTL puts exp in the past, beyond the default leeway
        let svc = AuthService::new("test-secret", -2, 4);
        let token = svc.issue_token("alice").unwrap();
        assert!(matches!(
            svc.verify_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let svc = service();
        let mut token = svc.issue_token("alice").unwrap();
        token.push('x');
        assert!(matches!(
            svc.verify_token(&token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn token_signed_with_other_key_is_invalid() {
        let token = AuthService::new("other-secret", 30, 4)
            .issue_token("alice")
            .unwrap();
        assert!(matches!(
            service().verify_token(&token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(
            service().verify_token("not.a.token"),
            Err(AuthError::TokenInvalid)
        ));
    }
}
