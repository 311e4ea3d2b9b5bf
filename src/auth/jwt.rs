//! JWT token issue and validation
//!
//! Tokens are signed with HS256. Each token carries a `jti` so logout can
//! revoke it durably for the remainder of its lifetime.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{ReliefError, Result};

/// Payload stored in a JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Granted role
    pub role: Role,
    /// Token identifier, used for revocation
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// JWT issuer and validator
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    expiry_seconds: u64,
}

impl TokenIssuer {
    /// Create a new issuer. The secret must be at least 32 characters.
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self> {
        if secret.len() < 32 {
            return Err(ReliefError::Config(
                "JWT secret must be at least 32 characters".into(),
            ));
        }
        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Issue a token for an authenticated identity.
    pub fn issue(&self, username: &str, role: Role) -> Result<(String, Claims)> {
        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: username.to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ReliefError::Internal(format!("failed to generate token: {e}")))?;

        Ok((token, claims))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            let msg = match err.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "invalid signature",
                _ => "invalid token",
            };
            ReliefError::Unauthorized(msg.into())
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
