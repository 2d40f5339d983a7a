//! One client interface over the certificate API, three interchangeable
//! implementations selected by configuration.
//!
//! - [`MemoryClient`]: store and auth live in this process.
//! - [`LocalClient`]: a JSON snapshot file private to this client; writes by
//!   one client are invisible to clients using another file.
//! - [`RemoteClient`]: the HTTP API server.

use async_trait::async_trait;
use thiserror::Error;

use crate::app::auth_service::{
    AuthError, LoginRequest, NonceRequest, NonceResponse, SignatureRequest, TokenResponse,
};
use crate::domain::{ActivityEntry, CertError, CertificateRecord, IssueReceipt, Submission};
use crate::infra::{BackendKind, Config};

pub mod local;
pub mod memory;
pub mod remote;

pub use local::LocalClient;
pub use memory::MemoryClient;
pub use remote::RemoteClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Cert(#[from] CertError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The server answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ClientError {
    /// True for "no such certificate", whichever backend reported it.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::Cert(CertError::NotFound { .. }) => true,
            ClientError::Rejected { status, .. } => *status == 404,
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Operations the front-end performs against the certificate service.
///
/// Mutating calls take the caller's session token, which a backend may
/// forward (remote) or ignore (memory, local).
#[async_trait]
pub trait CertificateApi: Send + Sync {
    /// Which implementation this is.
    fn backend(&self) -> BackendKind;

    async fn request_nonce(&self, req: NonceRequest) -> ClientResult<NonceResponse>;

    async fn verify_signature(&self, req: SignatureRequest) -> ClientResult<TokenResponse>;

    async fn email_login(&self, req: LoginRequest) -> ClientResult<TokenResponse>;

    async fn issue_certificate(
        &self,
        submission: Submission,
        token: Option<&str>,
    ) -> ClientResult<IssueReceipt>;

    async fn lookup_by_id(&self, id: &str) -> ClientResult<CertificateRecord>;

    async fn lookup_by_tx(&self, tx: &str) -> ClientResult<CertificateRecord>;

    async fn my_certificates(
        &self,
        address: Option<&str>,
        token: Option<&str>,
    ) -> ClientResult<Vec<CertificateRecord>>;

    async fn issuer_activity(&self, token: Option<&str>) -> ClientResult<Vec<ActivityEntry>>;

    async fn pending_certificates(&self) -> ClientResult<Vec<CertificateRecord>>;

    async fn admin_verify(&self, id: &str, token: Option<&str>) -> ClientResult<CertificateRecord>;
}

/// Builds the client selected by `config.backend`.
pub fn connect(config: &Config) -> anyhow::Result<Box<dyn CertificateApi>> {
    let client: Box<dyn CertificateApi> = match config.backend {
        BackendKind::Memory => Box::new(MemoryClient::from_config(config)),
        BackendKind::Local => Box::new(LocalClient::from_config(config)),
        BackendKind::Remote => Box::new(RemoteClient::new(&config.api_url)?),
    };
    tracing::debug!(backend = ?config.backend, "certificate client ready");
    Ok(client)
}
