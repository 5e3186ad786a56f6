use anyhow::Result;
use mealsub::{AppState, catalog::InMemoryCatalog, clock::Clock, config::Config};
use tower_http::trace::TraceLayer;

pub async fn serve(
    config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting mealsub server...");

    // Use CLI overrides if provided, otherwise use config
    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    let catalog = match &config.kitchen.catalog {
        Some(path) => InMemoryCatalog::from_file(path)?,
        None => {
            tracing::warn!("No catalog configured, every restaurant will be unknown");
            InMemoryCatalog::default()
        }
    };

    let state = AppState::new(Clock::Kitchen(config.kitchen.timezone.to_owned()), catalog);
    let app = mealsub::routes::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        timezone = %config.kitchen.timezone,
        "Server listening on {}",
        listener.local_addr()?
    );

    // Set up graceful shutdown signal handler
    let shutdown_signal = async {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to install Ctrl+C handler: {err}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(err) => {
                    tracing::error!("failed to install SIGTERM handler: {err}");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C signal");
            },
            _ = terminate => {
                tracing::info!("Received SIGTERM signal");
            },
        }

        tracing::info!("Starting graceful shutdown...");
    };

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}
