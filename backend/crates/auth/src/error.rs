//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system. Every variant maps to
//! a status, a machine-readable tag and a client-safe message; storage and
//! signing sources are logged, never rendered.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind, tag::ErrorTag};
use platform::db::DbError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    // ------------------------------------------------------------------
    // Not found
    // ------------------------------------------------------------------
    #[error("user not found")]
    UserNotFound,

    #[error("session not found")]
    SessionNotFound,

    #[error("active session not found")]
    ActiveSessionNotFound,

    // ------------------------------------------------------------------
    // Conflicts
    // ------------------------------------------------------------------
    #[error("e-mail already taken")]
    EmailTaken,

    #[error("username already taken")]
    UsernameTaken,

    /// Unique violation raced past the pre-checks.
    #[error("{0} already taken")]
    FieldTaken(String),

    // ------------------------------------------------------------------
    // Credentials and tokens
    // ------------------------------------------------------------------
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked")]
    AccountLocked,

    #[error("account is not activated")]
    AccountDisabled,

    #[error("access token not provided")]
    MissingAccessToken,

    /// No authenticated caller reached a service that requires one.
    #[error("user not authenticated")]
    Unauthenticated,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid access token")]
    InvalidAccessToken,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// Refresh token and session belong to different users.
    #[error("unauthorized user")]
    UserMismatch,

    // ------------------------------------------------------------------
    // Business expiry
    // ------------------------------------------------------------------
    #[error("session has expired")]
    SessionExpired,

    #[error("expired activation link")]
    ActivationExpired,

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------
    /// Entity construction rejected its input.
    #[error("{0}")]
    InvalidEntity(String),

    /// Malformed request input.
    #[error("{0}")]
    Validation(String),

    // ------------------------------------------------------------------
    // Infrastructure
    // ------------------------------------------------------------------
    /// Repository failure; `context` is the client-facing message.
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: DbError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Wrap a repository error, turning unique violations into conflicts.
    ///
    /// The e-mail and username columns answer like the pre-insert checks.
    pub fn storage(context: &'static str) -> impl FnOnce(DbError) -> AuthError {
        move |source| match source {
            DbError::UniqueViolation { field } => match field.as_str() {
                "email" => AuthError::EmailTaken,
                "username" => AuthError::UsernameTaken,
                _ => AuthError::FieldTaken(field),
            },
            source => AuthError::Storage { context, source },
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound
            | AuthError::SessionNotFound
            | AuthError::ActiveSessionNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::UsernameTaken | AuthError::FieldTaken(_) => {
                ErrorKind::Conflict
            }
            AuthError::InvalidCredentials
            | AuthError::AccountLocked
            | AuthError::AccountDisabled
            | AuthError::MissingAccessToken
            | AuthError::Unauthenticated
            | AuthError::TokenExpired
            | AuthError::InvalidAccessToken
            | AuthError::InvalidRefreshToken
            | AuthError::UserMismatch => ErrorKind::Unauthorized,
            AuthError::SessionExpired
            | AuthError::ActivationExpired
            | AuthError::Validation(_)
            | AuthError::Storage { .. } => ErrorKind::BadRequest,
            AuthError::InvalidEntity(_) => ErrorKind::UnprocessableEntity,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Machine-readable tag; defaults to the kind's tag.
    pub fn tag(&self) -> ErrorTag {
        match self {
            AuthError::AccountLocked => ErrorTag::LockedUser,
            AuthError::AccountDisabled => ErrorTag::DisabledUser,
            AuthError::TokenExpired => ErrorTag::TokenExpired,
            AuthError::SessionExpired | AuthError::ActivationExpired => ErrorTag::Expired,
            AuthError::InvalidEntity(_) => ErrorTag::InvalidEntity,
            other => other.kind().default_tag(),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Storage { context, source } => {
                tracing::error!(error = %source, context, "Auth storage error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials
            | AuthError::AccountLocked
            | AuthError::AccountDisabled
            | AuthError::UserMismatch => {
                tracing::warn!(error = %self, "Rejected authentication");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::SessionExpired | AuthError::ActivationExpired => AppError::expired(message),
            AuthError::InvalidEntity(_) => AppError::invalid_entity(message),
            AuthError::Internal(_) => AppError::internal(message),
            AuthError::Storage { source, .. } => AppError::bad_request(message).with_source(source),
            other => AppError::new(other.kind(), message).with_tag(other.tag()),
        }
    }
}
