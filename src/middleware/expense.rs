use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::models::{Budget, Expense};
use crate::validation::parse_positive_id;
use crate::AppState;

/// Path validation for `:expenseId`, symmetric to the budget id guard.
pub async fn validate_expense_id(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    parse_positive_id(params.get("expenseId"), "expenseId")?;
    Ok(next.run(request).await)
}

/// Expense existence guard: resolves the path identifier or fails with the
/// expense not-found message; store failures become a 500.
pub async fn validate_expense_exists(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expense_id = parse_positive_id(params.get("expenseId"), "expenseId")?;

    let expense = state
        .expenses
        .find_by_id(expense_id)
        .await
        .map_err(|e| {
            tracing::error!("store error resolving expense {}: {}", expense_id, e);
            ApiError::internal_server_error("Hubo un error al obtener los gastos del presupuesto")
        })?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No se encontró el gasto con expenseId: {expense_id}"
            ))
        })?;

    request.extensions_mut().insert(expense);

    Ok(next.run(request).await)
}

/// Nested-resource binding guard: the resolved expense must belong to the
/// budget addressed in the path. A mismatch answers exactly like a missing
/// expense so a valid expense id combined with a foreign budget id reveals
/// nothing; this closes the path-confusion hole even when the caller owns
/// both budgets.
pub async fn belongs_to_budget(request: Request, next: Next) -> Result<Response, ApiError> {
    let budget = request.extensions().get::<Budget>().ok_or_else(|| {
        ApiError::internal_server_error("Hubo un error al obtener el presupuesto")
    })?;

    let expense = request.extensions().get::<Expense>().ok_or_else(|| {
        ApiError::internal_server_error("Hubo un error al obtener los gastos del presupuesto")
    })?;

    if expense.budget_id != budget.id {
        return Err(ApiError::not_found(format!(
            "No se encontró el gasto con expenseId: {}",
            expense.id
        )));
    }

    Ok(next.run(request).await)
}
