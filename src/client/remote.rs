use anyhow::bail;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::{CertificateApi, ClientError, ClientResult};
use crate::app::auth_service::{
    LoginRequest, NonceRequest, NonceResponse, SignatureRequest, TokenResponse,
};
use crate::domain::{ActivityEntry, CertificateRecord, IssueReceipt, Submission};
use crate::infra::BackendKind;

/// Client for the HTTP API server.
pub struct RemoteClient {
    http: reqwest::Client,
    base: Url,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base_url.trim())?;
        if base.cannot_be_a_base() {
            bail!("API URL cannot carry a path: {}", base_url);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Base URL with `segments` appended, each percent-encoded as needed.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `with_client` rejects URLs without a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(segments));
        match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        token: Option<&str>,
    ) -> ClientResult<T> {
        let resp = self
            .request(Method::GET, segments, token)
            .query(query)
            .send()
            .await?;
        decode(resp).await
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B, token: Option<&str>) -> ClientResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .request(Method::POST, segments, token)
            .json(body)
            .send()
            .await?;
        decode(resp).await
    }
}

/// Any non-success status becomes `Rejected` carrying the server's message.
async fn decode<T: DeserializeOwned>(resp: Response) -> ClientResult<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    tracing::debug!(status = status.as_u16(), %message, "request rejected");
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CertificateApi for RemoteClient {
    fn backend(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn request_nonce(&self, req: NonceRequest) -> ClientResult<NonceResponse> {
        self.post(&["auth", "nonce"], &req, None).await
    }

    async fn verify_signature(&self, req: SignatureRequest) -> ClientResult<TokenResponse> {
        self.post(&["auth", "verify"], &req, None).await
    }

    async fn email_login(&self, req: LoginRequest) -> ClientResult<TokenResponse> {
        self.post(&["auth", "login"], &req, None).await
    }

    async fn issue_certificate(
        &self,
        submission: Submission,
        token: Option<&str>,
    ) -> ClientResult<IssueReceipt> {
        self.post(&["cert", "issue"], &submission, token).await
    }

    async fn lookup_by_id(&self, id: &str) -> ClientResult<CertificateRecord> {
        self.get(&["cert", "cid", id], &[], None).await
    }

    async fn lookup_by_tx(&self, tx: &str) -> ClientResult<CertificateRecord> {
        self.get(&["cert", "tx", tx], &[], None).await
    }

    async fn my_certificates(
        &self,
        address: Option<&str>,
        token: Option<&str>,
    ) -> ClientResult<Vec<CertificateRecord>> {
        let query: Vec<(&str, &str)> = address.map(|a| ("address", a)).into_iter().collect();
        self.get(&["student", "certificates"], &query, token).await
    }

    async fn issuer_activity(&self, token: Option<&str>) -> ClientResult<Vec<ActivityEntry>> {
        self.get(&["issuer", "activity"], &[], token).await
    }

    async fn pending_certificates(&self) -> ClientResult<Vec<CertificateRecord>> {
        self.get(&["cert", "pending"], &[], None).await
    }

    async fn admin_verify(&self, id: &str, token: Option<&str>) -> ClientResult<CertificateRecord> {
        self.post(&["cert", "admin-verify"], &json!({ "id": id }), token)
            .await
    }
}
