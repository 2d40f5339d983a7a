//! Error taxonomy for the certificate lifecycle.

use thiserror::Error;

/// Errors raised by validation, issuance, verification and lookup.
///
/// The `Display` text is what callers see: the HTTP layer forwards it verbatim
/// in the `error` field of the response body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid student address")]
    InvalidAddress,
    #[error("Certificate already issued: {0}")]
    DuplicateId(String),
    #[error("Certificate not found for {by}: {key}")]
    NotFound { by: LookupKey, key: String },
}

impl CertError {
    pub fn not_found_cid(id: impl Into<String>) -> Self {
        CertError::NotFound {
            by: LookupKey::Cid,
            key: id.into(),
        }
    }

    pub fn not_found_tx(tx: impl Into<String>) -> Self {
        CertError::NotFound {
            by: LookupKey::Tx,
            key: tx.into(),
        }
    }
}

/// Which index a failed lookup went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey {
    Cid,
    Tx,
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupKey::Cid => write!(f, "CID"),
            LookupKey::Tx => write!(f, "TX"),
        }
    }
}
