//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Session and auth services
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, router, bearer middleware
//!
//! ## Features
//! - Registration (disabled until activated) and activation
//! - Login issuing a 15 minute access token and a 30 day refresh token
//! - One active session per user, shadowed in the cache under `sess:<user id>`
//! - Access token renewal from a refresh token, logout
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - HS256 tokens verified with zero leeway
//! - A refresh token is only good while its session row is active and unexpired

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::{AuthConfig, AuthService, AuthUser, SessionService};
pub use error::{AuthError, AuthResult};
pub use infra::{MemorySessionRepository, MemoryUserRepository, PgAuthRepository};
pub use presentation::{AccessTokenVerifier, auth_router, require_auth, session_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
