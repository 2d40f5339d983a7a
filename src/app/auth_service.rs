//! Sign-in flows: wallet nonce challenge and demo e-mail login.
//!
//! Neither flow checks credentials. The wallet flow only requires that a
//! nonce was requested for the address first; the signature is accepted as
//! given. Both flows return a signed session token.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::crypto::{Claims, TokenCodec, TokenError};
use crate::domain::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Address and role required")]
    MissingAddressOrRole,
    #[error("Nonce not found")]
    NonceNotFound,
    #[error("Missing data")]
    MissingCredentials,
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Authorization token required")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("Role '{0}' may not perform this action")]
    Forbidden(Role),
    #[error("Could not issue token: {0}")]
    Signing(TokenError),
}

/// How long a requested nonce stays redeemable.
pub const NONCE_TTL_SECS: i64 = 300;
/// Outstanding nonces kept at once; the oldest is evicted beyond this.
pub const MAX_OUTSTANDING_NONCES: usize = 10_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NonceRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SignatureRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NonceResponse {
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

struct OutstandingNonce {
    nonce: String,
    role: Role,
    issued_at: DateTime<Utc>,
}

pub struct AuthService {
    codec: TokenCodec,
    nonces: HashMap<String, OutstandingNonce>,
    nonce_ttl: Duration,
    max_nonces: usize,
}

impl AuthService {
    pub fn new(codec: TokenCodec) -> Self {
        Self {
            codec,
            nonces: HashMap::new(),
            nonce_ttl: Duration::seconds(NONCE_TTL_SECS),
            max_nonces: MAX_OUTSTANDING_NONCES,
        }
    }

    pub fn with_nonce_limits(mut self, ttl: Duration, max_outstanding: usize) -> Self {
        self.nonce_ttl = ttl;
        self.max_nonces = max_outstanding.max(1);
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn outstanding_nonces(&self) -> usize {
        self.nonces.len()
    }

    /// Issues a fresh nonce for `address`, replacing any outstanding one.
    pub fn request_nonce(&mut self, req: &NonceRequest) -> Result<NonceResponse, AuthError> {
        let address = req.address.trim();
        if address.is_empty() || req.role.trim().is_empty() {
            return Err(AuthError::MissingAddressOrRole);
        }
        let role = parse_role(&req.role)?;

        let now = Utc::now();
        self.prune(now);
        let key = address.to_ascii_lowercase();
        if !self.nonces.contains_key(&key) && self.nonces.len() >= self.max_nonces {
            self.evict_oldest();
        }

        let nonce = uuid::Uuid::new_v4().to_string();
        self.nonces.insert(
            key,
            OutstandingNonce {
                nonce: nonce.clone(),
                role,
                issued_at: now,
            },
        );
        tracing::debug!(%address, %role, "nonce issued");
        Ok(NonceResponse { nonce })
    }

    /// Completes the wallet sign-in.
    ///
    /// The nonce is consumed only when a token is returned; a rejected request
    /// leaves it redeemable.
    pub fn verify_signature(&mut self, req: &SignatureRequest) -> Result<TokenResponse, AuthError> {
        let address = req.address.trim();
        let key = address.to_ascii_lowercase();
        let now = Utc::now();
        if self.nonces.get(&key).is_some_and(|n| self.is_expired(n, now)) {
            self.nonces.remove(&key);
        }
        let outstanding = self.nonces.get(&key).ok_or(AuthError::NonceNotFound)?;

        let role = if req.role.trim().is_empty() {
            outstanding.role
        } else {
            parse_role(&req.role)?
        };
        if !req.message.is_empty() && !req.message.contains(&outstanding.nonce) {
            tracing::warn!(%address, "signed message does not quote the nonce");
        }

        let token = self
            .codec
            .issue(address, role, Some(address.to_string()))
            .map_err(AuthError::Signing)?;
        self.nonces.remove(&key);
        tracing::info!(%address, %role, "wallet sign-in");
        Ok(TokenResponse {
            token,
            role: Some(role),
        })
    }

    /// Demo e-mail login for issuers and verifiers.
    pub fn login(&self, req: &LoginRequest) -> Result<TokenResponse, AuthError> {
        let email = req.email.trim();
        if email.is_empty() || req.password.is_empty() || req.role.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let role = parse_role(&req.role)?;
        let token = self
            .codec
            .issue(email, role, None)
            .map_err(AuthError::Signing)?;
        tracing::info!(%email, %role, "e-mail sign-in");
        Ok(TokenResponse {
            token,
            role: Some(role),
        })
    }

    /// Decodes a bearer token and checks its role against `allowed`.
    pub fn authorize(&self, token: Option<&str>, allowed: &[Role]) -> Result<Claims, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let claims = self.codec.decode(token)?;
        if !allowed.contains(&claims.role) {
            return Err(AuthError::Forbidden(claims.role));
        }
        Ok(claims)
    }

    fn is_expired(&self, nonce: &OutstandingNonce, now: DateTime<Utc>) -> bool {
        nonce.issued_at + self.nonce_ttl <= now
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.nonce_ttl;
        self.nonces.retain(|_, n| n.issued_at + ttl > now);
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .nonces
            .iter()
            .min_by_key(|(_, n)| n.issued_at)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            tracing::debug!(address = %key, "evicting oldest outstanding nonce");
            self.nonces.remove(&key);
        }
    }
}

fn parse_role(raw: &str) -> Result<Role, AuthError> {
    raw.parse::<Role>()
        .map_err(|_| AuthError::UnknownRole(raw.trim().to_string()))
}
