use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::Claims;
use crate::config::SecurityConfig;
use crate::database::models::Admin;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    Generation(String),

    /// Malformed, tampered and expired tokens are deliberately indistinguishable.
    #[error("Invalid or expired token")]
    Invalid,
}

/// A freshly signed token plus the timing data handed back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
}

/// Issues and verifies HS256 access tokens with a process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        let ttl = i64::try_from(security.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| TokenError::Generation("token TTL out of range".to_string()))?;
        Self::new(&security.jwt_secret, ttl)
    }

    pub fn issue(&self, admin: &Admin) -> Result<IssuedToken, TokenError> {
        self.issue_at(admin, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, admin: &Admin, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Generation("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: admin.id,
            username: admin.username.clone(),
            role: admin.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;

        tracing::debug!("Issued token for {} ({}), expires at {}", admin.username, admin.role, expires_at);

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.ttl.num_seconds(),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "bad signature",
                    ErrorKind::InvalidAlgorithm => "unexpected algorithm",
                    ErrorKind::MissingRequiredClaim(_) => "missing claim",
                    _ => "malformed",
                };
                tracing::debug!("Rejected token {} ({}): {}", fingerprint(token), reason, e);
                Err(TokenError::Invalid)
            }
        }
    }
}

/// Short, non-reversible token identifier suitable for logs.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..12].to_string()
}
