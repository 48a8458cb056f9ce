//! Application Layer
//!
//! Services orchestrating the domain, repositories and cache.

pub mod auth_service;
pub mod auth_user;
pub mod cache_key;
pub mod config;
pub mod session_service;

// Re-exports
pub use auth_service::{AuthService, ClientInfo, LoginInput, LoginOutput, RegisterInput};
pub use auth_user::AuthUser;
pub use config::AuthConfig;
pub use session_service::{RenewedAccessToken, SessionService};
