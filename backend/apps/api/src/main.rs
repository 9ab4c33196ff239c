//! API Server Entry Point
//!
//! Read-only front end over the observation index: `GET /ping` and
//! `GET /waves`. Uses `anyhow` for startup errors; request-level errors
//! are `waves::WavesError` rendered as problem documents.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::client::{HttpClientConfig, build_client};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waves::{EsObservationStore, HarvestConfig, ObservationStoreConfig, waves_router};

const DEFAULT_PORT: u16 = 31113;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,waves=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Observation index
    let elasticsearch_url =
        env::var("ELASTICSEARCH_URL").context("ELASTICSEARCH_URL must be set in environment")?;

    let mut harvest_config = HarvestConfig::default();
    if let Ok(collection) = env::var("WAVES_INDEX") {
        harvest_config.collection = collection;
    }
    if let Ok(secs) = env::var("HARVEST_TIMEOUT_SECS") {
        let secs: u64 = secs.parse().context("HARVEST_TIMEOUT_SECS must be a number of seconds")?;
        harvest_config.operation_timeout = Duration::from_secs(secs);
    }

    let client = build_client(&HttpClientConfig::with_timeout(harvest_config.operation_timeout))?;
    let store = EsObservationStore::new(
        client,
        &ObservationStoreConfig {
            base_url: elasticsearch_url,
        },
    )?;

    tracing::info!(collection = %harvest_config.collection, "Serving observations");

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([Method::GET, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([header::ACCEPT]));

    // Build router
    let app = Router::new()
        .merge(waves_router(store, harvest_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = match env::var("API_PORT") {
        Ok(port) => port.parse().context("API_PORT must be a port number")?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
