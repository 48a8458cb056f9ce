//! Database call helpers
//!
//! Every repository call runs under [`with_timeout`] so a slow store surfaces
//! as [`DbError::Timeout`] instead of hanging the request. Driver errors are
//! classified here once, so services only ever see [`DbError`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;

/// Ceiling for a single repository call.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Unique constraint violated; `field` is the offending column.
    #[error("{field} already taken")]
    UniqueViolation { field: String },

    #[error("database error: {0}")]
    Query(#[source] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DbError::Timeout(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let field = err.as_database_error().and_then(|db_err| {
            if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
                return None;
            }
            let from_detail = db_err
                .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                .and_then(|pg| pg.detail())
                .and_then(field_from_detail);
            Some(
                from_detail
                    .or_else(|| db_err.constraint().and_then(field_from_constraint))
                    .unwrap_or_else(|| "value".to_string()),
            )
        });

        match field {
            Some(field) => DbError::UniqueViolation { field },
            None => DbError::Query(err),
        }
    }
}

/// Run `future` with a deadline, classifying its error.
///
/// ```no_run
/// # use platform::db::{with_timeout, DEFAULT_QUERY_TIMEOUT, DbResult};
/// # async fn example(pool: &sqlx::PgPool) -> DbResult<()> {
/// with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("UPDATE sessions SET active = false").execute(pool),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> DbResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(result) => result.map_err(DbError::from),
        Err(_) => Err(DbError::Timeout(duration)),
    }
}

/// `Key (email)=(a@x.com) already exists.` → `email`
///
/// Composite keys (`Key (a, b)=...`) yield the first column.
pub fn field_from_detail(detail: &str) -> Option<String> {
    let start = detail.find("Key (")? + "Key (".len();
    let rest = &detail[start..];
    let end = rest.find(")=")?;
    let column = rest[..end].split(',').next()?.trim().trim_matches('"');
    (!column.is_empty()).then(|| column.to_string())
}

/// `users_email_key` → `email`, following Postgres' default naming.
fn field_from_constraint(constraint: &str) -> Option<String> {
    let body = constraint
        .strip_suffix("_key")
        .or_else(|| constraint.strip_suffix("_idx"))?;
    let (_, column) = body.split_once('_')?;
    (!column.is_empty()).then(|| column.to_string())
}
