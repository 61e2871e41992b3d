pub mod auth;
pub mod config;
pub mod emails;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use emails::Mailer;
use store::{BudgetStore, ExpenseStore, UserStore};

/// Shared application state: the persistence collaborators and the mail
/// dispatch seam, injected so the guard chain and handlers can run against
/// the in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub expenses: Arc<dyn ExpenseStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Build state from a single store implementing all three resource
    /// traits.
    pub fn with_store<S>(store: Arc<S>, mailer: Arc<dyn Mailer>) -> Self
    where
        S: UserStore + BudgetStore + ExpenseStore + 'static,
    {
        Self {
            users: store.clone(),
            budgets: store.clone(),
            expenses: store,
            mailer,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/budgets", budget_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use handlers::auth;

    let protected = Router::new()
        .route("/user", get(auth::current_user))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::authenticate,
        ));

    Router::new()
        .route("/create-account", post(auth::create_account))
        .route("/confirm-account", post(auth::confirm_account))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/validate-token", post(auth::validate_token))
        .route("/reset-password/:token", post(auth::reset_password))
        .merge(protected)
}

/// Guard ordering is fixed here: layers apply bottom-up, so for a nested
/// expense route the request passes authenticate → validate_budget_id →
/// validate_budget_exists → has_access → validate_expense_id →
/// validate_expense_exists → belongs_to_budget → handler. Each guard may
/// assume exactly its predecessors' context and nothing more.
fn budget_routes(state: AppState) -> Router<AppState> {
    use axum::middleware::{from_fn, from_fn_with_state};
    use handlers::{budgets, expenses};

    let expense_scoped = Router::new()
        .route(
            "/:budgetId/expenses/:expenseId",
            get(expenses::get_by_id)
                .put(expenses::update_by_id)
                .delete(expenses::delete_by_id),
        )
        .layer(from_fn(middleware::belongs_to_budget))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::validate_expense_exists,
        ))
        .layer(from_fn(middleware::validate_expense_id));

    let budget_scoped = Router::new()
        .route(
            "/:budgetId",
            get(budgets::get_by_id)
                .put(budgets::update_by_id)
                .delete(budgets::delete_by_id),
        )
        .route("/:budgetId/expenses", post(expenses::create))
        .merge(expense_scoped)
        .layer(from_fn(middleware::has_access))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::validate_budget_exists,
        ))
        .layer(from_fn(middleware::validate_budget_id));

    Router::new()
        .route("/", get(budgets::get_all).post(budgets::create))
        .merge(budget_scoped)
        .layer(from_fn_with_state(state, middleware::authenticate))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "CashTrackr API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth/* (public - account management)",
            "budgets": "/api/budgets[/:budgetId] (protected)",
            "expenses": "/api/budgets/:budgetId/expenses[/:expenseId] (protected)",
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
