use crate::app::auth_service::AuthError;
use crate::app::{AuthService, CertificateService};
use crate::domain::CertError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub certificates: Arc<Mutex<CertificateService>>,
    pub auth: Arc<Mutex<AuthService>>,
    /// When false, mutating endpoints accept any caller.
    pub enforce_roles: bool,
}

impl AppState {
    pub fn new(certificates: CertificateService, auth: AuthService, enforce_roles: bool) -> Self {
        Self {
            certificates: Arc::new(Mutex::new(certificates)),
            auth: Arc::new(Mutex::new(auth)),
            enforce_roles,
        }
    }
}

/// Envelope for health and error responses.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, ToSchema)]
pub struct AdminVerifyRequest {
    #[serde(default, alias = "cid")]
    pub id: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct StudentQuery {
    pub address: Option<String>,
}

/// A failed request: status plus the message shown to the caller.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<CertError> for ApiError {
    fn from(err: CertError) -> Self {
        let status = match err {
            CertError::MissingField(_) | CertError::InvalidAddress | CertError::DuplicateId(_) => {
                StatusCode::BAD_REQUEST
            }
            CertError::NotFound { .. } => StatusCode::NOT_FOUND,
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingAddressOrRole
            | AuthError::NonceNotFound
            | AuthError::MissingCredentials
            | AuthError::UnknownRole(_) => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.message, "request failed");
        } else {
            tracing::warn!(status = self.status.as_u16(), error = %self.message, "request rejected");
        }
        (
            self.status,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some(self.message),
            }),
        )
            .into_response()
    }
}

pub fn json_422(err: JsonRejection, expected: &str) -> ApiError {
    ApiError::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Invalid JSON body: {} (expected: {})", err, expected),
    )
}

pub fn query_400(err: QueryRejection) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid query: {}", err))
}
