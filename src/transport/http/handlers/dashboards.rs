//! Read-only feeds behind the student and issuer dashboards.

use crate::app::certificate_service::ISSUER_FEED_LEN;
use crate::domain::{ActivityEntry, CertificateRecord};
use crate::transport::http::types::{query_400, ApiError, AppState, StudentQuery};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

#[utoipa::path(
    get,
    path = "/student/certificates",
    params(("address" = Option<String>, Query, description = "Wallet address; omit to list every certificate")),
    responses(
        (status = 200, description = "Certificates held by the address", body = [CertificateRecord])
    )
)]
pub async fn student_certificates_handler(
    State(state): State<AppState>,
    query: Result<Query<StudentQuery>, QueryRejection>,
) -> Result<Json<Vec<CertificateRecord>>, ApiError> {
    let Query(query) = query.map_err(query_400)?;
    let certificates = state.certificates.lock().await;
    Ok(Json(
        certificates.student_certificates(query.address.as_deref()),
    ))
}

#[utoipa::path(
    get,
    path = "/issuer/activity",
    responses(
        (status = 200, description = "Most recent issue/verify events, newest first", body = [ActivityEntry])
    )
)]
pub async fn issuer_activity_handler(State(state): State<AppState>) -> Json<Vec<ActivityEntry>> {
    let certificates = state.certificates.lock().await;
    Json(certificates.recent_activity(ISSUER_FEED_LEN))
}
