use crate::app::auth_service::{
    LoginRequest, NonceRequest, NonceResponse, SignatureRequest, TokenResponse,
};
use crate::domain::{ActivityEntry, ActivityKind, CertificateRecord, IssueReceipt, Role, Submission};
use crate::transport::http::handlers::{auth, certificates, dashboards, health};
use crate::transport::http::types::{AdminVerifyRequest, ApiResponse};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        auth::nonce_handler,
        auth::verify_handler,
        auth::login_handler,
        certificates::issue_handler,
        certificates::admin_verify_handler,
        certificates::by_cid_handler,
        certificates::by_tx_handler,
        certificates::pending_handler,
        dashboards::student_certificates_handler,
        dashboards::issuer_activity_handler
    ),
    components(schemas(
        ApiResponse,
        NonceRequest,
        NonceResponse,
        SignatureRequest,
        LoginRequest,
        TokenResponse,
        Role,
        Submission,
        IssueReceipt,
        AdminVerifyRequest,
        CertificateRecord,
        ActivityEntry,
        ActivityKind
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/auth/nonce", post(auth::nonce_handler))
        .route("/auth/verify", post(auth::verify_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/cert/issue", post(certificates::issue_handler))
        .route("/cert/admin-verify", post(certificates::admin_verify_handler))
        .route("/cert/cid/:id", get(certificates::by_cid_handler))
        .route("/cert/tx/:transaction_id", get(certificates::by_tx_handler))
        .route("/cert/pending", get(certificates::pending_handler))
        .route(
            "/student/certificates",
            get(dashboards::student_certificates_handler),
        )
        .route("/issuer/activity", get(dashboards::issuer_activity_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
