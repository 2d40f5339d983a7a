//! HS256 session tokens.
//!
//! Tokens are standard JWTs minted and checked with `jsonwebtoken`. Only this
//! process can mint or check them: the key is the configured secret, or a
//! random one generated at startup.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Role;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Wallet address or e-mail of the signed-in actor.
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("unexpected token algorithm")]
    WrongAlgorithm,
    #[error("token expired")]
    Expired,
    #[error("could not sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm,
            _ => TokenError::Malformed,
        }
    }
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(key: impl AsRef<[u8]>, ttl_secs: i64) -> Self {
        let key = key.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl_secs,
        }
    }

    /// Codec with a key that dies with the process.
    pub fn with_random_key(ttl_secs: i64) -> Self {
        use rand::RngCore;
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(key, ttl_secs)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Mints a token for `sub` valid from now for the configured TTL.
    pub fn issue(&self, sub: &str, role: Role, address: Option<String>) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            role,
            address,
            iat: now,
            exp: now + self.ttl_secs,
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks algorithm, signature and expiry and returns the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token.trim(), &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
