//! Guard-level tests driving the budget guard chain against a probe route
//! with a counting handler, proving that a failing guard terminates the
//! request before the handler runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::routing::get;
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use cashtrackr_api::emails::RecordingMailer;
use cashtrackr_api::middleware::{
    has_access, validate_budget_exists, validate_budget_id, validate_expense_exists,
    validate_expense_id,
};
use cashtrackr_api::models::{AuthUser, Budget, Expense};
use cashtrackr_api::store::{BudgetStore, MemoryStore};
use cashtrackr_api::AppState;

fn actor(id: i64) -> AuthUser {
    AuthUser {
        id,
        name: "Probe".to_string(),
        email: "probe@gmail.com".to_string(),
    }
}

/// Probe route guarded by validate_budget_id → validate_budget_exists and,
/// when an actor is injected, has_access. The handler counts its invocations
/// and echoes the budget resolved into context.
fn guarded_probe(
    store: Arc<MemoryStore>,
    inject_actor: Option<AuthUser>,
) -> (Router, Arc<AtomicUsize>) {
    let state = AppState::with_store(store, Arc::new(RecordingMailer::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let handler = move |Extension(budget): Extension<Budget>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Json(json!({ "name": budget.name }))
        }
    };

    let mut router = Router::new().route("/:budgetId", get(handler));

    if inject_actor.is_some() {
        router = router.layer(from_fn(has_access));
    }
    router = router
        .layer(from_fn_with_state(state.clone(), validate_budget_exists))
        .layer(from_fn(validate_budget_id));
    if let Some(user) = inject_actor {
        router = router.layer(from_fn(move |mut req: Request, next: Next| {
            let user = user.clone();
            async move {
                req.extensions_mut().insert(user);
                next.run(req).await
            }
        }));
    }

    (router.with_state(state), calls)
}

async fn send(router: Router, path: &str) -> Result<(StatusCode, Value)> {
    let response = router
        .oneshot(axum::http::Request::builder().uri(path).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn missing_budget_short_circuits_the_handler() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let (router, calls) = guarded_probe(store, None);

    let (status, body) = send(router, "/5").await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No se encontro el presupuesto con budgetId: 5");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn store_failure_maps_to_internal_error() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store.poison();
    let (router, calls) = guarded_probe(store, None);

    let (status, body) = send(router, "/5").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Hubo un error al obtener el presupuesto");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn expense_store_failure_maps_to_internal_error() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store.poison();
    let state = AppState::with_store(store, Arc::new(RecordingMailer::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let handler = move |Extension(expense): Extension<Expense>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Json(json!({ "name": expense.name }))
        }
    };

    let router = Router::new()
        .route("/:expenseId", get(handler))
        .layer(from_fn_with_state(state.clone(), validate_expense_exists))
        .layer(from_fn(validate_expense_id))
        .with_state(state);

    let (status, body) = send(router, "/5").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        "Hubo un error al obtener los gastos del presupuesto"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn id_validation_runs_before_any_lookup() -> Result<()> {
    // A poisoned store would answer 500; a 400 proves the lookup never ran
    let store = Arc::new(MemoryStore::new());
    store.poison();
    let (router, calls) = guarded_probe(store, None);

    let (status, body) = send(router, "/abc").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["msg"], "budgetId inválido");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn resolved_budget_is_attached_to_context() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let budget = store.create(1, "Casa", Decimal::new(3000, 0)).await?;
    let (router, calls) = guarded_probe(store, None);

    let (status, body) = send(router, &format!("/{}", budget.id)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Casa");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn ownership_guard_blocks_a_foreign_actor() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let budget = store.create(1, "Casa", Decimal::new(3000, 0)).await?;
    let (router, calls) = guarded_probe(store, Some(actor(2)));

    let (status, body) = send(router, &format!("/{}", budget.id)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Acción no válida");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn ownership_guard_passes_the_owner_through() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let budget = store.create(1, "Casa", Decimal::new(3000, 0)).await?;
    let (router, calls) = guarded_probe(store, Some(actor(1)));

    let (status, body) = send(router, &format!("/{}", budget.id)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Casa");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}
