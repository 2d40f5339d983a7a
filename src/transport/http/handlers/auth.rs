use crate::app::auth_service::{
    LoginRequest, NonceRequest, NonceResponse, SignatureRequest, TokenResponse,
};
use crate::transport::http::types::{json_422, ApiError, ApiResponse, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    post,
    path = "/auth/nonce",
    request_body = NonceRequest,
    responses(
        (status = 200, description = "Sign-in challenge issued", body = NonceResponse),
        (status = 400, description = "Address or role missing", body = ApiResponse)
    )
)]
pub async fn nonce_handler(
    State(state): State<AppState>,
    payload: Result<Json<NonceRequest>, JsonRejection>,
) -> Result<Json<NonceResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| json_422(e, "{ address, role }"))?;
    let mut auth = state.auth.lock().await;
    Ok(Json(auth.request_nonce(&req)?))
}

#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = SignatureRequest,
    responses(
        (status = 200, description = "Wallet sign-in completed", body = TokenResponse),
        (status = 400, description = "No outstanding nonce for the address", body = ApiResponse)
    )
)]
pub async fn verify_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignatureRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| json_422(e, "{ address, role, signature, message }"))?;
    let mut auth = state.auth.lock().await;
    Ok(Json(auth.verify_signature(&req)?))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Demo login succeeded", body = TokenResponse),
        (status = 400, description = "Missing data", body = ApiResponse)
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| json_422(e, "{ email, password, role }"))?;
    let auth = state.auth.lock().await;
    Ok(Json(auth.login(&req)?))
}
