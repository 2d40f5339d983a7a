use crate::domain::Role;
use crate::transport::http::types::{ApiError, AppState};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Roles allowed to issue certificates when enforcement is on.
pub const ISSUE_ROLES: &[Role] = &[Role::Issuer, Role::Admin];
/// Roles allowed to approve pending certificates when enforcement is on.
pub const VERIFY_ROLES: &[Role] = &[Role::Admin, Role::Verifier];

/// `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

/// Checks the caller's token against `allowed`.
///
/// A no-op unless the server runs with role enforcement enabled.
pub async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<(), ApiError> {
    if !state.enforce_roles {
        return Ok(());
    }
    let auth = state.auth.lock().await;
    let claims = auth.authorize(bearer_token(headers), allowed)?;
    tracing::debug!(sub = %claims.sub, role = %claims.role, "caller authorized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);
    }
}
