use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CertificateApi, ClientResult};
use crate::app::auth_service::{
    LoginRequest, NonceRequest, NonceResponse, SignatureRequest, TokenResponse,
};
use crate::app::certificate_service::ISSUER_FEED_LEN;
use crate::app::{AuthService, CertificateService};
use crate::domain::{ActivityEntry, CertificateRecord, IssueReceipt, Submission};
use crate::infra::{BackendKind, Config};

/// Client over services held in this process.
///
/// Clones share the same store, so a `MemoryClient` can sit next to an HTTP
/// server built from the same services.
#[derive(Clone)]
pub struct MemoryClient {
    certificates: Arc<Mutex<CertificateService>>,
    auth: Arc<Mutex<AuthService>>,
}

impl MemoryClient {
    pub fn new(
        certificates: Arc<Mutex<CertificateService>>,
        auth: Arc<Mutex<AuthService>>,
    ) -> Self {
        Self { certificates, auth }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(Mutex::new(CertificateService::new(
                config.default_issuer.clone(),
            ))),
            Arc::new(Mutex::new(AuthService::new(config.token_codec()))),
        )
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[async_trait]
impl CertificateApi for MemoryClient {
    fn backend(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn request_nonce(&self, req: NonceRequest) -> ClientResult<NonceResponse> {
        Ok(self.auth.lock().await.request_nonce(&req)?)
    }

    async fn verify_signature(&self, req: SignatureRequest) -> ClientResult<TokenResponse> {
        Ok(self.auth.lock().await.verify_signature(&req)?)
    }

    async fn email_login(&self, req: LoginRequest) -> ClientResult<TokenResponse> {
        Ok(self.auth.lock().await.login(&req)?)
    }

    async fn issue_certificate(
        &self,
        submission: Submission,
        _token: Option<&str>,
    ) -> ClientResult<IssueReceipt> {
        Ok(self.certificates.lock().await.issue(submission)?)
    }

    async fn lookup_by_id(&self, id: &str) -> ClientResult<CertificateRecord> {
        Ok(self.certificates.lock().await.by_id(id)?)
    }

    async fn lookup_by_tx(&self, tx: &str) -> ClientResult<CertificateRecord> {
        Ok(self.certificates.lock().await.by_transaction_id(tx)?)
    }

    async fn my_certificates(
        &self,
        address: Option<&str>,
        _token: Option<&str>,
    ) -> ClientResult<Vec<CertificateRecord>> {
        Ok(self.certificates.lock().await.student_certificates(address))
    }

    async fn issuer_activity(&self, _token: Option<&str>) -> ClientResult<Vec<ActivityEntry>> {
        Ok(self.certificates.lock().await.recent_activity(ISSUER_FEED_LEN))
    }

    async fn pending_certificates(&self) -> ClientResult<Vec<CertificateRecord>> {
        Ok(self.certificates.lock().await.pending())
    }

    async fn admin_verify(&self, id: &str, _token: Option<&str>) -> ClientResult<CertificateRecord> {
        Ok(self.certificates.lock().await.verify(id)?)
    }
}
