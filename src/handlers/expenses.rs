use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{Budget, Expense};
use crate::validation::validate_money_inputs;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DraftExpense {
    pub name: Option<String>,
    pub amount: Option<Value>,
}

/// POST /api/budgets/:budgetId/expenses - the parent budget comes from the
/// resolved path context, never from the request body
pub async fn create(
    State(state): State<AppState>,
    Extension(budget): Extension<Budget>,
    Json(payload): Json<DraftExpense>,
) -> Response {
    let (name, amount) = match validate_money_inputs(&payload.name, &payload.amount, "gasto") {
        Ok(validated) => validated,
        Err(errors) => return ApiError::validation(errors).into_response(),
    };

    match state.expenses.create(budget.id, &name, amount).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!("Gasto Agregado Correctamente")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("store error creating expense in budget {}: {}", budget.id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error al crear gasto" })),
            )
                .into_response()
        }
    }
}

/// GET /api/budgets/:budgetId/expenses/:expenseId
pub async fn get_by_id(Extension(expense): Extension<Expense>) -> Response {
    Json(expense).into_response()
}

/// PUT /api/budgets/:budgetId/expenses/:expenseId
pub async fn update_by_id(
    State(state): State<AppState>,
    Extension(expense): Extension<Expense>,
    Json(payload): Json<DraftExpense>,
) -> Response {
    let (name, amount) = match validate_money_inputs(&payload.name, &payload.amount, "gasto") {
        Ok(validated) => validated,
        Err(errors) => return ApiError::validation(errors).into_response(),
    };

    match state.expenses.update(expense.id, &name, amount).await {
        Ok(()) => Json(json!("Gasto Actualizado Correctamente")).into_response(),
        Err(e) => {
            tracing::error!("store error updating expense {}: {}", expense.id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error al actualizar el gasto" })),
            )
                .into_response()
        }
    }
}

/// DELETE /api/budgets/:budgetId/expenses/:expenseId
pub async fn delete_by_id(
    State(state): State<AppState>,
    Extension(expense): Extension<Expense>,
) -> Response {
    match state.expenses.delete(expense.id).await {
        Ok(()) => Json(json!("Gasto Eliminado Correctamente")).into_response(),
        Err(e) => {
            tracing::error!("store error deleting expense {}: {}", expense.id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Error al eliminar el gasto" })),
            )
                .into_response()
        }
    }
}
