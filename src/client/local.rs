use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CertificateApi, ClientResult};
use crate::app::auth_service::{
    LoginRequest, NonceRequest, NonceResponse, SignatureRequest, TokenResponse,
};
use crate::app::certificate_service::ISSUER_FEED_LEN;
use crate::app::{AuthService, CertificateService};
use crate::domain::{ActivityEntry, CertError, CertificateRecord, IssueReceipt, Submission};
use crate::infra::{BackendKind, Config};
use crate::storage::SnapshotFile;

/// Client whose store is a JSON snapshot file.
///
/// Every call loads the file, applies one operation and writes the file back
/// if the operation changed anything. Calls through the same `LocalClient`
/// are serialized; separate processes sharing a file are not coordinated.
pub struct LocalClient {
    file: SnapshotFile,
    default_issuer: String,
    auth: Mutex<AuthService>,
    io: Mutex<()>,
}

impl LocalClient {
    pub fn new(file: SnapshotFile, default_issuer: impl Into<String>, auth: AuthService) -> Self {
        Self {
            file,
            default_issuer: default_issuer.into(),
            auth: Mutex::new(auth),
            io: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SnapshotFile::new(config.local_db_path.clone()),
            config.default_issuer.clone(),
            AuthService::new(config.token_codec()),
        )
    }

    pub fn file(&self) -> &SnapshotFile {
        &self.file
    }

    fn load(&self) -> ClientResult<CertificateService> {
        let snapshot = self.file.load()?;
        Ok(CertificateService::from_snapshot(
            snapshot,
            self.default_issuer.clone(),
        ))
    }

    async fn read<T>(
        &self,
        op: impl FnOnce(&CertificateService) -> Result<T, CertError>,
    ) -> ClientResult<T> {
        let _guard = self.io.lock().await;
        let service = self.load()?;
        Ok(op(&service)?)
    }

    async fn write<T>(
        &self,
        op: impl FnOnce(&mut CertificateService) -> Result<T, CertError>,
    ) -> ClientResult<T> {
        let _guard = self.io.lock().await;
        let mut service = self.load()?;
        let out = op(&mut service)?;
        self.file.save(&service.snapshot())?;
        Ok(out)
    }
}

#[async_trait]
impl CertificateApi for LocalClient {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
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
        self.write(move |svc| svc.issue(submission)).await
    }

    async fn lookup_by_id(&self, id: &str) -> ClientResult<CertificateRecord> {
        self.read(|svc| svc.by_id(id)).await
    }

    async fn lookup_by_tx(&self, tx: &str) -> ClientResult<CertificateRecord> {
        self.read(|svc| svc.by_transaction_id(tx)).await
    }

    async fn my_certificates(
        &self,
        address: Option<&str>,
        _token: Option<&str>,
    ) -> ClientResult<Vec<CertificateRecord>> {
        self.read(|svc| Ok(svc.student_certificates(address))).await
    }

    async fn issuer_activity(&self, _token: Option<&str>) -> ClientResult<Vec<ActivityEntry>> {
        self.read(|svc| Ok(svc.recent_activity(ISSUER_FEED_LEN)))
            .await
    }

    async fn pending_certificates(&self) -> ClientResult<Vec<CertificateRecord>> {
        self.read(|svc| Ok(svc.pending())).await
    }

    async fn admin_verify(&self, id: &str, _token: Option<&str>) -> ClientResult<CertificateRecord> {
        self.write(|svc| svc.verify(id)).await
    }
}
