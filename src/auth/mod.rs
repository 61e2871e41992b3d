use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config;

/// Session credential payload. Stateless: everything needed to resolve the
/// acting user is embedded and signature-protected.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, expiry_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: user_id,
            exp: (now + Duration::days(expiry_days)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("JWT verification error: {0}")]
    TokenVerification(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Sign a session credential for the given user id using the configured
/// secret and expiry window.
pub fn generate_jwt(user_id: i64) -> Result<String, JwtError> {
    let security = &config::config().security;
    let claims = Claims::new(user_id, security.jwt_expiry_days);
    sign(&claims, &security.jwt_secret)
}

/// Verify a session credential against the configured secret. Fails closed on
/// bad signatures, expiry, malformed tokens and missing secrets; never panics.
pub fn verify_jwt(token: &str) -> Result<Claims, JwtError> {
    verify(token, &config::config().security.jwt_secret)
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn verify(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::TokenVerification(e.to_string()))
}

/// Six-digit one-shot code used for account confirmation and password reset.
pub fn generate_token() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trips_the_user_id() {
        let claims = Claims::new(42, 30);
        let token = sign(&claims, SECRET).unwrap();
        let decoded = verify(&token, SECRET).unwrap();
        assert_eq!(decoded.id, 42);
        assert_eq!(decoded.exp, claims.exp);
    }

    #[test]
    fn rejects_expired_tokens() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: 7,
            // Beyond the default 60s validation leeway
            exp: now - 120,
            iat: now - 240,
        };
        let token = sign(&claims, SECRET).unwrap();
        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn rejects_tampered_signatures() {
        let token = sign(&Claims::new(1, 30), SECRET).unwrap();
        assert!(verify(&token, "other-secret").is_err());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(verify("not-a-jwt", SECRET).is_err());
        assert!(verify("", SECRET).is_err());
    }

    #[test]
    fn refuses_to_sign_with_empty_secret() {
        assert!(matches!(
            sign(&Claims::new(1, 30), ""),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn one_shot_tokens_are_six_digits() {
        for _ in 0..50 {
            let token = generate_token();
            assert_eq!(token.len(), 6);
            assert!(token.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
