use std::sync::Arc;

use cashtrackr_api::emails::TracingMailer;
use cashtrackr_api::store::PostgresStore;
use cashtrackr_api::{app, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cashtrackr_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("starting CashTrackr API in {:?} mode", config.environment);

    let store = PostgresStore::connect().await?;
    store.ensure_schema().await?;
    tracing::info!("database connected");

    let state = AppState::with_store(Arc::new(store), Arc::new(TracingMailer));
    let router = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("CashTrackr API listening on http://{}", bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
