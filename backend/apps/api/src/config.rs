//! Server configuration loaded from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use chrono::TimeDelta;
use stop::{GeoFence, StopConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    /// `None` selects the in-process cache.
    pub redis_url: Option<String>,
    pub db_max_connections: u32,
    pub db_query_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub stop: StopConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                       |
    /// |------------------------------|-------------------------------|
    /// | `DATABASE_URL`               | required                      |
    /// | `REDIS_URL`                  | unset (in-process cache)      |
    /// | `JWT_SECRET`                 | required in release builds    |
    /// | `JWT_ACCESS_TOKEN_TTL_SECS`  | `900`                         |
    /// | `JWT_REFRESH_TOKEN_TTL_SECS` | `2592000`                     |
    /// | `SESSION_CACHE_TTL_SECS`     | `1800`                        |
    /// | `USER_CACHE_TTL_SECS`        | `900`                         |
    /// | `DB_QUERY_TIMEOUT_MS`        | `2000`                        |
    /// | `DB_MAX_CONNECTIONS`         | `5`                           |
    /// | `PASSWORD_PEPPER`            | unset                         |
    /// | `STOP_GEOFENCE`              | unset                         |
    /// | `BIND_ADDR`                  | `0.0.0.0:8080`                |
    /// | `FRONTEND_ORIGINS`           | `http://localhost:5173,...`   |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let mut auth = match var("JWT_SECRET") {
            Some(secret) => AuthConfig::new(secret),
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using a random development secret");
                AuthConfig::development()
            }
            None => bail!("JWT_SECRET must be set in release builds"),
        };
        auth.access_token_ttl = token_ttl(&var, "JWT_ACCESS_TOKEN_TTL_SECS", 900)?;
        auth.refresh_token_ttl = token_ttl(&var, "JWT_REFRESH_TOKEN_TTL_SECS", 2_592_000)?;
        auth.session_cache_ttl =
            Duration::from_secs(parse_or(&var, "SESSION_CACHE_TTL_SECS", 1800)?);
        auth.user_cache_ttl = Duration::from_secs(parse_or(&var, "USER_CACHE_TTL_SECS", 900)?);
        auth.password_pepper = var("PASSWORD_PEPPER").map(String::into_bytes);

        if auth.access_token_ttl <= TimeDelta::zero()
            || auth.refresh_token_ttl <= auth.access_token_ttl
        {
            bail!("refresh token TTL must be longer than a positive access token TTL");
        }

        let db_query_timeout = Duration::from_millis(parse_or(&var, "DB_QUERY_TIMEOUT_MS", 2000)?);

        let geofence = var("STOP_GEOFENCE")
            .map(|raw| GeoFence::from_str(&raw).map_err(|e| anyhow::anyhow!("STOP_GEOFENCE: {e}")))
            .transpose()?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            redis_url: var("REDIS_URL"),
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 5)?,
            db_query_timeout,
            bind_addr: parse_or(&var, "BIND_ADDR", DEFAULT_BIND_ADDR.parse::<SocketAddr>()?)?,
            frontend_origins,
            auth,
            stop: StopConfig {
                query_timeout: db_query_timeout,
                geofence,
            },
        })
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is malformed: {raw:?}")),
        None => Ok(default),
    }
}

/// Seconds from `key`; values `TimeDelta` cannot hold are rejected.
fn token_ttl(
    var: impl Fn(&str) -> Option<String>,
    key: &str,
    default: i64,
) -> anyhow::Result<TimeDelta> {
    let secs = parse_or(var, key, default)?;
    TimeDelta::try_seconds(secs).with_context(|| format!("{key} is out of range: {secs}"))
}
