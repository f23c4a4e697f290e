use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use departure_server::board::{BoardClient, BoardSource, MockBoardSource};
use departure_server::config::ServerConfig;
use departure_server::service::DepartureService;
use departure_server::stops::NameResolver;
use departure_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "departure_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    });

    // Load stop data (fail fast if unusable)
    let directory = config.load_directory()?;
    info!(
        stops = directory.len(),
        identifiers = directory.id_count(),
        "loaded stop directory"
    );
    let unmapped = directory.unmapped_names().count();
    if unmapped > 0 {
        warn!(unmapped, "some stop names have no identifier and will not resolve");
    }

    let resolver = NameResolver::new(Arc::new(directory), config.resolver.clone());

    let source: Arc<dyn BoardSource> = match &config.mock_boards_dir {
        Some(dir) => {
            let mock = MockBoardSource::new(dir)?;
            info!(dir = %dir.display(), stops = mock.available_stops().len(), "serving mock departure boards");
            Arc::new(mock)
        }
        None => {
            info!(base_url = %config.board.base_url, "using live departure monitor");
            Arc::new(BoardClient::new(config.board.clone())?)
        }
    };

    let service = DepartureService::new(resolver, source, config.parser()?);

    let shutdown = CancellationToken::new();
    let state = AppState::new(service, config.board_timeout, shutdown.clone())
        .with_request_timeout(config.request_timeout);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "departure server listening");
    info!("  GET /health");
    info!("  GET /v1/departures/stations/{{key}}");
    info!("  GET /v1/stations/search?q=...&limit=...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("departure server stopped");
    Ok(())
}

/// Wait for Ctrl-C, then cancel in-flight requests.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
    shutdown.cancel();
}
