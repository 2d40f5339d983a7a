use crate::domain::{CertificateRecord, IssueReceipt, Submission};
use crate::transport::http::handlers::common::{authorize, ISSUE_ROLES, VERIFY_ROLES};
use crate::transport::http::types::{
    json_422, AdminVerifyRequest, ApiError, ApiResponse, AppState,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

#[utoipa::path(
    post,
    path = "/cert/issue",
    request_body = Submission,
    responses(
        (status = 200, description = "Certificate stored as pending", body = IssueReceipt),
        (status = 400, description = "Missing field, invalid address or duplicate id", body = ApiResponse),
        (status = 401, description = "Token required (role enforcement only)", body = ApiResponse),
        (status = 403, description = "Role may not issue (role enforcement only)", body = ApiResponse)
    )
)]
pub async fn issue_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<IssueReceipt>, ApiError> {
    let Json(submission) = payload.map_err(|e| {
        json_422(e, "{ id, studentAddress, name, degree, major, year }")
    })?;
    authorize(&state, &headers, ISSUE_ROLES).await?;

    let mut certificates = state.certificates.lock().await;
    Ok(Json(certificates.issue(submission)?))
}

#[utoipa::path(
    post,
    path = "/cert/admin-verify",
    request_body = AdminVerifyRequest,
    responses(
        (status = 200, description = "Updated certificate", body = CertificateRecord),
        (status = 400, description = "Missing id", body = ApiResponse),
        (status = 404, description = "Certificate not found", body = ApiResponse)
    )
)]
pub async fn admin_verify_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AdminVerifyRequest>, JsonRejection>,
) -> Result<Json<CertificateRecord>, ApiError> {
    let Json(req) = payload.map_err(|e| json_422(e, "{ id }"))?;
    let id = req.id.trim();
    if id.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "id is required"));
    }
    authorize(&state, &headers, VERIFY_ROLES).await?;

    let mut certificates = state.certificates.lock().await;
    Ok(Json(certificates.verify(id)?))
}

#[utoipa::path(
    get,
    path = "/cert/cid/{id}",
    params(("id" = String, Path, description = "Certificate identifier (CID)")),
    responses(
        (status = 200, description = "Certificate", body = CertificateRecord),
        (status = 404, description = "Certificate not found", body = ApiResponse)
    )
)]
pub async fn by_cid_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CertificateRecord>, ApiError> {
    let certificates = state.certificates.lock().await;
    Ok(Json(certificates.by_id(&id)?))
}

#[utoipa::path(
    get,
    path = "/cert/tx/{transaction_id}",
    params(("transaction_id" = String, Path, description = "Issuance transaction id")),
    responses(
        (status = 200, description = "Certificate", body = CertificateRecord),
        (status = 404, description = "Certificate not found", body = ApiResponse)
    )
)]
pub async fn by_tx_handler(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<CertificateRecord>, ApiError> {
    let certificates = state.certificates.lock().await;
    Ok(Json(certificates.by_transaction_id(&transaction_id)?))
}

#[utoipa::path(
    get,
    path = "/cert/pending",
    responses(
        (status = 200, description = "Certificates awaiting verification, oldest first", body = [CertificateRecord])
    )
)]
pub async fn pending_handler(State(state): State<AppState>) -> Json<Vec<CertificateRecord>> {
    let certificates = state.certificates.lock().await;
    Json(certificates.pending())
}
