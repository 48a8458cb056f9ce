//! In-memory repositories
//!
//! Process-local stand-ins for the PostgreSQL repositories. They keep the
//! same contract, including unique e-mail, username and refresh token.

use std::collections::HashMap;

use chrono::Utc;
use kernel::id::{SessionId, UserId};
use platform::db::{DbError, DbResult};
use tokio::sync::RwLock;

use crate::domain::entity::{Session, User};
use crate::domain::model::{SessionRecord, UserRecord};
use crate::domain::repository::{SessionRepository, UserRepository};

#[derive(Default)]
pub struct MemorySessionRepository {
    rows: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with `active = true` for a user.
    pub async fn count_active(&self, user_id: &UserId) -> usize {
        self.rows
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id.as_str() && r.active)
            .count()
    }
}

impl SessionRepository for MemorySessionRepository {
    async fn insert(&self, session: &Session) -> DbResult<()> {
        let record = session.to_record();
        let mut rows = self.rows.write().await;
        if rows.contains_key(&record.id) {
            return Err(unique("id"));
        }
        if rows.values().any(|r| r.refresh_token == record.refresh_token) {
            return Err(unique("refresh_token"));
        }
        rows.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, session: &Session) -> DbResult<()> {
        let record = session.to_record();
        self.rows.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn get_by_id(&self, id: &SessionId) -> DbResult<Option<Session>> {
        Ok(self
            .rows
            .read()
            .await
            .get(id.as_str())
            .cloned()
            .map(Session::from_record))
    }

    async fn get_by_refresh_token(&self, refresh_token: &str) -> DbResult<Option<Session>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.refresh_token == refresh_token)
            .cloned()
            .map(Session::from_record))
    }

    async fn get_active_by_user_id(&self, user_id: &UserId) -> DbResult<Option<Session>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id.as_str() && r.active)
            .max_by_key(|r| r.created_at)
            .cloned()
            .map(Session::from_record))
    }

    async fn get_all_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Session>> {
        let mut records: Vec<SessionRecord> = self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id.as_str())
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records.into_iter().map(Session::from_record).collect())
    }

    async fn deactivate_all(&self, user_id: &UserId) -> DbResult<u64> {
        let now = Utc::now();
        let mut touched = 0;
        for record in self.rows.write().await.values_mut() {
            if record.user_id == user_id.as_str() && record.active {
                record.active = false;
                record.updated_at = now;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn delete(&self, id: &SessionId) -> DbResult<()> {
        self.rows.write().await.remove(id.as_str());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> DbResult<()> {
        let record = user.to_record();
        let mut rows = self.rows.write().await;
        if rows.values().any(|r| r.email == record.email) {
            return Err(unique("email"));
        }
        if rows.values().any(|r| r.username == record.username) {
            return Err(unique("username"));
        }
        rows.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, user: &User) -> DbResult<()> {
        let record = user.to_record();
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.get_mut(&record.id) {
            *row = record;
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &UserId) -> DbResult<Option<User>> {
        Ok(self
            .rows
            .read()
            .await
            .get(id.as_str())
            .cloned()
            .map(User::from_record))
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.email == email)
            .cloned()
            .map(User::from_record))
    }

    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.username == username)
            .cloned()
            .map(User::from_record))
    }
}

fn unique(field: &str) -> DbError {
    DbError::UniqueViolation {
        field: field.to_string(),
    }
}
