use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::models::{AuthUser, Budget};
use crate::validation::parse_positive_id;
use crate::AppState;

/// Path validation for `:budgetId`: must be a positive integer or the request
/// never reaches the existence guard.
pub async fn validate_budget_id(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    parse_positive_id(params.get("budgetId"), "budgetId")?;
    Ok(next.run(request).await)
}

/// Budget existence guard: resolves the path identifier to a persisted budget
/// and attaches it to request context. Store failures are converted to a 500
/// with no partial context attached.
pub async fn validate_budget_exists(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let budget_id = parse_positive_id(params.get("budgetId"), "budgetId")?;

    let budget = state
        .budgets
        .find_by_id(budget_id)
        .await
        .map_err(|e| {
            tracing::error!("store error resolving budget {}: {}", budget_id, e);
            ApiError::internal_server_error("Hubo un error al obtener el presupuesto")
        })?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No se encontro el presupuesto con budgetId: {budget_id}"
            ))
        })?;

    request.extensions_mut().insert(budget);

    Ok(next.run(request).await)
}

/// Ownership guard: runs strictly after `authenticate` and
/// `validate_budget_exists`; both the actor and the resolved budget must
/// already be in context. The rejection message deliberately does not reveal
/// whether the budget exists for another user.
pub async fn has_access(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("No autorizado"))?;

    let budget = request.extensions().get::<Budget>().ok_or_else(|| {
        ApiError::internal_server_error("Hubo un error al obtener el presupuesto")
    })?;

    if budget.user_id != user.id {
        return Err(ApiError::forbidden("Acción no válida"));
    }

    Ok(next.run(request).await)
}
