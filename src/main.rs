use std::{net::SocketAddr, sync::Arc};

use anyhow::{bail, Context};
use tokio::signal;
use tracing::{info, warn};

use order_board as app;
use order_board::store::{DocumentStore, FirestoreStore, InMemoryDocumentStore};

fn build_store(cfg: &app::config::AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if cfg.uses_firestore() {
        let Some(settings) = cfg.firestore_settings() else {
            bail!("store_backend is firestore but no project id is configured");
        };
        info!(project = %settings.project_id, database = %settings.database, "Using Firestore store");
        let store = FirestoreStore::new(settings).context("failed to build Firestore client")?;
        return Ok(Arc::new(store));
    }

    let store = match &cfg.seed_file {
        Some(path) => {
            info!(seed_file = %path, "Using in-memory store seeded from file");
            InMemoryDocumentStore::from_seed_file(path)
                .with_context(|| format!("failed to load seed file {path}"))?
        }
        None => {
            warn!("Using empty in-memory store; the board will report no orders");
            InMemoryDocumentStore::new()
        }
    };
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = app::config::load_config()?;
    app::config::init_tracing(cfg.log_level(), cfg.log_json);

    let store = build_store(&cfg)?;
    let board = Arc::new(app::services::OrderBoard::mount(store, cfg.collection.clone()).await);
    if let Some(failure) = board.load_error().await {
        warn!(error = %failure, "Board mounted without orders");
    }

    let logger = app::logging::setup_logger(app::logging::LoggerConfig {
        use_color: cfg.is_development(),
        ..Default::default()
    });
    let router = app::app_router(app::AppState::with_logger(board, logger));

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cfg.host, cfg.port))?;
    info!("order-board listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
