//! JWT token management
//!
//! Issues and verifies the HS256 tokens that carry a caller identity.

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::voting::Identity;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (caller identity)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Signing and verification keys for the deployment's shared secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_minutes)
    }

    /// Create a token for `identity`, valid for the configured lifetime
    pub fn issue(&self, identity: &Identity) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        self.sign(&Claims {
            sub: identity.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), claims, &self.encoding)
    }

    /// Decode and validate a token (signature and expiry)
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Invalid token signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::Unauthorized("Invalid token".to_string())
                }
                _ => AppError::Unauthorized(format!("Token validation failed: {}", e)),
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_decodes_to_identity() {
        let keys = TokenKeys::new("test-secret", 15);
        let token = keys.issue(&Identity::new("0xB")).unwrap();
        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.sub, "0xB");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let token = TokenKeys::new("other-secret", 15)
            .issue(&Identity::new("0xA"))
            .unwrap();
        let err = TokenKeys::new("test-secret", 15).decode(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Invalid token signature"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = TokenKeys::new("test-secret", 15);
        let now = Utc::now().timestamp();
        let token = keys
            .sign(&Claims {
                sub: "0xB".to_string(),
                exp: now - 3600,
                iat: now - 7200,
            })
            .unwrap();
        let err = keys.decode(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token expired"));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let keys = TokenKeys::new("test-secret", 15);
        assert!(matches!(keys.decode("not-a-token"), Err(AppError::Unauthorized(_))));
    }
}
