//! JWT issuing and verification.
//!
//! HS256 with a shared secret. The secret comes from `SORO_JWT_SECRET`;
//! when unset the server falls back to a well-known default, which is an
//! operational risk and is logged loudly at startup.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::UserId;

/// Env var holding the signing secret.
pub const JWT_SECRET_ENV: &str = "SORO_JWT_SECRET";

/// Used when `SORO_JWT_SECRET` is unset. Do not ship production traffic
/// on this.
const FALLBACK_SECRET: &str = "fallback-secret";

/// Token lifetime: 7 days.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims embedded in a Soro token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user id the token was issued for.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Build from `SORO_JWT_SECRET`, warning when the fallback default
    /// is used.
    pub fn from_env() -> Self {
        match std::env::var(JWT_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => Self::new(&secret),
            _ => {
                tracing::warn!(
                    "{} is not set; using the insecure fallback secret",
                    JWT_SECRET_ENV
                );
                Self::new(FALLBACK_SECRET)
            }
        }
    }

    /// Issue a token for the user, valid for 7 days.
    pub fn issue(&self, user_id: &UserId) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
