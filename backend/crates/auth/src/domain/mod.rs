//! Domain Layer
//!
//! Contains entities, value objects, persistence models and repository traits.

pub mod entity;
pub mod model;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Session, SessionSummary, User, UserSummary};
pub use repository::{SessionRepository, UserRepository};
