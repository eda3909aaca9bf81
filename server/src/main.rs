//! Carebook HTTP server binary.
//!
//! Connects storage, runs migrations, seeds the provider catalog and the
//! rolling slot window, then serves the booking API until shutdown.

use carebook_core::store::ProviderStore;
use carebook_core::{ensure_providers, ensure_slot_window, SystemClock};
use carebook_postgres::PgStores;
use carebook_server::{build_router, AppState, Config};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carebook=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Carebook HTTP server");

    let config = Config::from_env();
    info!(postgres_url = %config.postgres.url, "Configuration loaded");

    info!("Connecting to database...");
    let stores = PgStores::connect(&config.postgres.url, config.postgres.max_connections).await?;
    stores.migrate().await?;
    info!("Database connected, migrations applied");

    let stores = Arc::new(stores);
    let clock = Arc::new(SystemClock);

    // Idempotent startup seeding: provider catalog, then the rolling slot
    // window. Both short-circuit on a fresh count check when already done.
    let seed = ensure_providers(stores.as_ref()).await?;
    info!(inserted = seed.inserted, skipped = seed.skipped_existing, "provider catalog ready");

    let providers = stores.list(None).await?;
    let window = ensure_slot_window(stores.as_ref(), &providers, clock.as_ref()).await?;
    info!(inserted = window.inserted, skipped = window.skipped_existing, "slot window ready");

    let state = AppState::new(stores.clone(), stores.clone(), stores, clock);
    let app = build_router(state);

    let addr = config.bind_addr();
    info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
