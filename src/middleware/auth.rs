use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::verify_jwt;
use crate::error::ApiError;
use crate::AppState;

/// Authentication guard: extracts the bearer credential, verifies it and
/// resolves the acting user into request context.
///
/// Only the id/name/email projection is attached; the password hash never
/// reaches request context. A token that verifies but whose user id no
/// longer resolves is rejected as unauthorized.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let claims = verify_jwt(token).map_err(|e| {
        tracing::debug!("session credential rejected: {}", e);
        ApiError::unauthorized("Token inválido")
    })?;

    let user = state
        .users
        .find_auth_user(claims.id)
        .await
        .map_err(|e| {
            tracing::error!("store error resolving authenticated user: {}", e);
            ApiError::unauthorized("Token inválido")
        })?
        .ok_or_else(|| {
            tracing::warn!("valid credential for nonexistent user id {}", claims.id);
            ApiError::unauthorized("Token inválido")
        })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let bearer = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("No autorizado"))?;

    let bearer = bearer
        .to_str()
        .map_err(|_| ApiError::unauthorized("Token inválido"))?;

    bearer
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Token inválido"))
}
