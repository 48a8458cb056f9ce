//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer
//! (PostgreSQL and an in-memory store). Absence is `Ok(None)`, never an
//! error; every other failure is a [`DbError`].

use kernel::id::{SessionId, UserId};
use platform::db::DbResult;

use crate::domain::entity::{Session, User};

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn insert(&self, session: &Session) -> DbResult<()>;

    /// Full-row update by id.
    async fn update(&self, session: &Session) -> DbResult<()>;

    async fn get_by_id(&self, id: &SessionId) -> DbResult<Option<Session>>;

    async fn get_by_refresh_token(&self, refresh_token: &str) -> DbResult<Option<Session>>;

    /// The single active session of a user, if any.
    async fn get_active_by_user_id(&self, user_id: &UserId) -> DbResult<Option<Session>>;

    /// All sessions of a user, newest first.
    async fn get_all_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Session>>;

    /// Set `active = false` on every session of a user. Returns rows touched.
    async fn deactivate_all(&self, user_id: &UserId) -> DbResult<u64>;

    async fn delete(&self, id: &SessionId) -> DbResult<()>;
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn insert(&self, user: &User) -> DbResult<()>;

    async fn update(&self, user: &User) -> DbResult<()>;

    async fn get_by_id(&self, id: &UserId) -> DbResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>>;

    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>>;
}
