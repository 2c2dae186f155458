//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use anyhow::Context;
use article::{DiskUploadStore, PgArticleRepository, article_router};
use auth::{CallerState, MemoryNonceStore, PgNonceStore, resolve_caller, siwe_router, siwe_router_generic};
use axum::{
    Router, http,
    http::{Method, header},
    middleware::from_fn_with_state,
    routing::get,
};
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, NonceStoreKind};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// How often expired nonces are swept from Postgres
const NONCE_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,article=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired nonces
    // Errors here should not prevent server startup
    let nonce_store = PgNonceStore::new(pool.clone());
    if let Err(e) = nonce_store.cleanup_expired().await {
        tracing::warn!(error = %e, "SIWE nonce cleanup failed, continuing anyway");
    }

    let uploads = DiskUploadStore::new(config.upload_dir.clone());
    uploads.init().await.context("failed to create upload directory")?;

    let siwe_config = config.siwe_config();
    tracing::info!(
        admins = siwe_config.admins.len(),
        domain = ?siwe_config.expected_domain,
        nonce_store = ?config.nonce_store,
        "SIWE configured"
    );

    let siwe = match config.nonce_store {
        NonceStoreKind::Postgres => {
            spawn_nonce_cleanup(nonce_store.clone(), NONCE_CLEANUP_INTERVAL);
            siwe_router(nonce_store, siwe_config.clone())
        }
        NonceStoreKind::Memory => siwe_router_generic(MemoryNonceStore::new(), siwe_config.clone()),
    };

    let articles = article_router(
        PgArticleRepository::new(pool.clone()),
        uploads,
        config.article_config(),
    );

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/", get(health))
        .merge(siwe)
        .merge(articles)
        .layer(from_fn_with_state(CallerState::new(siwe_config), resolve_caller))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Sweep expired nonces every `period` for the life of the process
fn spawn_nonce_cleanup(store: PgNonceStore, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = store.cleanup_expired().await {
                tracing::warn!(error = %e, "Periodic SIWE nonce cleanup failed");
            }
        }
    });
}

/// GET /
async fn health() -> &'static str {
    "DecentraNews API is running"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
