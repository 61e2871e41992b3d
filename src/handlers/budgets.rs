use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{AuthUser, Budget};
use crate::validation::validate_money_inputs;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DraftBudget {
    pub name: Option<String>,
    // Amounts arrive as JSON numbers or numeric strings
    pub amount: Option<Value>,
}

/// GET /api/budgets - the actor's budgets, newest first
pub async fn get_all(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    match state.budgets.list_by_user(user.id).await {
        Ok(budgets) => Json(budgets).into_response(),
        Err(e) => {
            tracing::error!("store error listing budgets: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Hubo un error" })),
            )
                .into_response()
        }
    }
}

/// POST /api/budgets - owner is always the authenticated actor, never
/// client-supplied input
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DraftBudget>,
) -> Response {
    let (name, amount) = match validate_money_inputs(&payload.name, &payload.amount, "presupuesto")
    {
        Ok(validated) => validated,
        Err(errors) => return ApiError::validation(errors).into_response(),
    };

    match state.budgets.create(user.id, &name, amount).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!("Presupuesto creado correctamente")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("store error creating budget: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Hubo un error al crear el presupuesto" })),
            )
                .into_response()
        }
    }
}

/// GET /api/budgets/:budgetId - the resolved budget plus its expenses
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(budget): Extension<Budget>,
) -> Response {
    let expenses = match state.expenses.list_by_budget(budget.id).await {
        Ok(expenses) => expenses,
        Err(e) => {
            tracing::error!("store error listing expenses for budget {}: {}", budget.id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Hubo un error al obtener los gastos del presupuesto" })),
            )
                .into_response();
        }
    };

    let mut body = match serde_json::to_value(&budget) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("budget serialization failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Hubo un error al obtener el presupuesto" })),
            )
                .into_response();
        }
    };
    body["expenses"] = json!(expenses);

    Json(body).into_response()
}

/// PUT /api/budgets/:budgetId
pub async fn update_by_id(
    State(state): State<AppState>,
    Extension(budget): Extension<Budget>,
    Json(payload): Json<DraftBudget>,
) -> Response {
    let (name, amount) = match validate_money_inputs(&payload.name, &payload.amount, "presupuesto")
    {
        Ok(validated) => validated,
        Err(errors) => return ApiError::validation(errors).into_response(),
    };

    match state.budgets.update(budget.id, &name, amount).await {
        Ok(()) => Json(json!("Presupuesto actualizado correctamente")).into_response(),
        Err(e) => {
            tracing::error!("store error updating budget {}: {}", budget.id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Hubo un error al actualizar el presupuesto" })),
            )
                .into_response()
        }
    }
}

/// DELETE /api/budgets/:budgetId - expenses cascade in the store
pub async fn delete_by_id(
    State(state): State<AppState>,
    Extension(budget): Extension<Budget>,
) -> Response {
    match state.budgets.delete(budget.id).await {
        Ok(()) => Json(json!("Presupuesto eliminado correctamente")).into_response(),
        Err(e) => {
            tracing::error!("store error deleting budget {}: {}", budget.id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Hubo un error al eliminar el presupuesto" })),
            )
                .into_response()
        }
    }
}
