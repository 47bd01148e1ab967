use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mirror_server::config::AppConfig;
use mirror_server::database::init_db;
use mirror_server::state::AppState;
use mirror_server::sync::Synchronizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    info!("Database connected and schema synced");

    let synchronizer =
        Synchronizer::from_config(&config.upstream).context("Invalid upstream config")?;
    info!(
        base_url = %config.upstream.base_url,
        display_offset = %synchronizer.display_offset(),
        "Judge API client ready"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db: db.clone(),
        config,
        synchronizer,
    };
    let app = mirror_server::build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await.context("Failed to close database pool")?;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
