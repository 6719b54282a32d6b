//! Entry point for the catalog-server binary.

use catalog_server::{
    config::ServerConfig,
    server::{build_app, init_tracing},
    state::AppState,
};
use catalog_store::StoreConfig;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ServerConfig::from_env()?;
    let store_config = StoreConfig::from_env()?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!("Starting catalog-server");
    tracing::info!(
        "Configuration: addr={}, log_level={}, backend={:?}, graphiql={}",
        config.socket_addr(),
        config.log_level,
        store_config.backend,
        config.graphiql_enabled
    );

    // Open the repository; runs migrations for PostgreSQL
    let repository = catalog_store::open(&store_config).await?;

    let state = AppState::new(repository, config.clone());
    let app = build_app(state, &config);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
