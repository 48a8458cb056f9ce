//! Stop Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind, tag::ErrorTag};
use platform::db::DbError;
use thiserror::Error;

pub type StopResult<T> = Result<T, StopError>;

#[derive(Debug, Error)]
pub enum StopError {
    #[error("stop not found")]
    NotFound,

    /// Unique violation, e.g. two stops whose names slug the same.
    #[error("{0} already taken")]
    FieldTaken(String),

    #[error("{0}")]
    InvalidEntity(String),

    #[error("{0}")]
    Validation(String),

    /// Repository failure; `context` is the client-facing message.
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: DbError,
    },
}

impl StopError {
    /// Wrap a repository error, turning unique violations into conflicts.
    pub fn storage(context: &'static str) -> impl FnOnce(DbError) -> StopError {
        move |source| match source {
            DbError::UniqueViolation { field } => StopError::FieldTaken(field),
            source => StopError::Storage { context, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StopError::NotFound => ErrorKind::NotFound,
            StopError::FieldTaken(_) => ErrorKind::Conflict,
            StopError::InvalidEntity(_) => ErrorKind::UnprocessableEntity,
            StopError::Validation(_) | StopError::Storage { .. } => ErrorKind::BadRequest,
        }
    }

    pub fn tag(&self) -> ErrorTag {
        match self {
            StopError::InvalidEntity(_) => ErrorTag::InvalidEntity,
            other => other.kind().default_tag(),
        }
    }

    fn log(&self) {
        match self {
            StopError::Storage { context, source } => {
                tracing::error!(error = %source, context, "Stop storage error");
            }
            _ => tracing::debug!(error = %self, "Stop error"),
        }
    }
}

impl IntoResponse for StopError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<StopError> for AppError {
    fn from(err: StopError) -> Self {
        let message = err.to_string();
        match err {
            StopError::InvalidEntity(_) => AppError::invalid_entity(message),
            StopError::Storage { source, .. } => AppError::bad_request(message).with_source(source),
            other => AppError::new(other.kind(), message).with_tag(other.tag()),
        }
    }
}
