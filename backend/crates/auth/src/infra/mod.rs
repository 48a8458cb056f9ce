//! Infrastructure Layer
//!
//! PostgreSQL repositories and their in-memory counterparts.

pub mod memory;
pub mod postgres;

pub use memory::{MemorySessionRepository, MemoryUserRepository};
pub use postgres::PgAuthRepository;
