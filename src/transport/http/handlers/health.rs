use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let certificates = state.certificates.lock().await;
    let total = certificates.store().len();
    let pending = certificates.store().pending().count();
    drop(certificates);

    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(serde_json::json!({
                "status": "ok",
                "certificates": total,
                "pending": pending,
            })),
            error: None,
        }),
    )
}
