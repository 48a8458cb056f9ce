//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by each
//! crate's error type.

mod cache;
mod config;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::{AccessTokenVerifier, AuthService, PgAuthRepository, SessionService};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::cache::Cache;
use sqlx::postgres::PgPoolOptions;
use stop::{PgStopRepository, StopService, stop_router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::AppCache;
use crate::config::ApiConfig;
use crate::health::HealthState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,stop=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Cache
    let app_cache = AppCache::from_url(config.redis_url.as_deref()).await?;
    let cache_backend = app_cache.backend();
    let cache = Cache::new(app_cache);

    // Auth
    let auth_config = Arc::new(config.auth.clone());
    let auth_repo =
        Arc::new(PgAuthRepository::new(pool.clone()).with_query_timeout(config.db_query_timeout));
    let sessions = SessionService::new(
        auth_repo.clone(),
        auth_repo.clone(),
        cache.clone(),
        auth_config.clone(),
    );
    let auth_service = AuthService::new(sessions, auth_repo.clone(), auth_repo, auth_config.clone());
    let verifier = AccessTokenVerifier::new(&auth_config);

    // Stops
    let stop_repo = Arc::new(
        PgStopRepository::new(pool.clone()).with_query_timeout(config.stop.query_timeout),
    );
    let stop_service = StopService::new(stop_repo, Arc::new(config.stop.clone()));

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| tracing::warn!(%origin, "Ignoring malformed CORS origin"))
                .ok()
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
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
        .nest("/auth", auth::auth_router(auth_service.clone(), verifier.clone()))
        .nest("/sessions", auth::session_router(auth_service, verifier.clone()))
        .nest("/stops", stop_router(stop_service, verifier))
        .merge(health::router(HealthState {
            pool,
            cache,
            cache_backend,
        }))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
