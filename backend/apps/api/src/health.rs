//! GET /health

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use platform::cache::Cache;
use platform::db::with_timeout;
use serde::Serialize;
use sqlx::PgPool;

use crate::cache::AppCache;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
const PROBE_KEY: &str = "health:probe";

#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub cache: Cache<AppCache>,
    pub cache_backend: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
    pub cache_backend: &'static str,
}

fn up(ok: bool) -> &'static str {
    if ok { "up" } else { "down" }
}

async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = with_timeout(
        PROBE_TIMEOUT,
        sqlx::query("SELECT 1").execute(&state.pool),
    )
    .await
    .inspect_err(|e| tracing::warn!(error = %e, "Database health probe failed"))
    .is_ok();

    let cache_ok = state
        .cache
        .has(PROBE_KEY)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Cache health probe failed"))
        .is_ok();

    let healthy = db_ok && cache_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            version: env!("CARGO_PKG_VERSION"),
            database: up(db_ok),
            cache: up(cache_ok),
            cache_backend: state.cache_backend,
        }),
    )
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}
