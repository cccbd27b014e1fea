//! Emote server entry point.

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, extract::DefaultBodyLimit};
use emotes_api::{AppState, router as api_router};
use emotes_common::{Config, LocalFilePlacement};
use emotes_core::EmoteService;
use emotes_db::DbEmoteStore;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emotes=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting emote server...");

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Connect to database
    let db = emotes_db::init(&config)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    emotes_db::migrate(&db).await?;
    info!("Migrations completed");

    tokio::fs::create_dir_all(&config.emotes.content_dir).await?;
    tokio::fs::create_dir_all(&config.emotes.upload_dir).await?;

    let store = Arc::new(DbEmoteStore::new(Arc::new(db)));
    let placement = Arc::new(
        LocalFilePlacement::new(config.emotes.content_dir.clone())
            .with_url_prefix(config.emotes.image_url_prefix.clone()),
    );
    let emote_service = EmoteService::new(store, placement, config.emotes.clone());
    info!(
        content_dir = %config.emotes.content_dir.display(),
        "Emote storage ready"
    );

    let app = Router::new()
        .nest("/api", api_router())
        .layer(DefaultBodyLimit::max(config.server.body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState::new(emote_service));

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
