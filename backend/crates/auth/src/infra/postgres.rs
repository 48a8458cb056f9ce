//! PostgreSQL Repository Implementations

use std::time::Duration;

use kernel::id::{SessionId, UserId};
use platform::db::{DEFAULT_QUERY_TIMEOUT, DbResult, with_timeout};
use sqlx::PgPool;

use crate::domain::entity::{Session, User};
use crate::domain::model::{SessionRecord, UserRecord};
use crate::domain::repository::{SessionRepository, UserRepository};

const SESSION_COLUMNS: &str =
    "id, user_id, ip, agent, refresh_token, active, expires_at, created_at, updated_at";

const USER_COLUMNS: &str = "id, name, username, email, password, avatar_url, enabled, locked, \
     activated_at, created_at, updated_at";

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch_session(&self, filter: &str, value: &str) -> DbResult<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE {filter}");
        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, SessionRecord>(&sql)
                .bind(value)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(Session::from_record))
    }

    async fn fetch_user(&self, column: &str, value: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, UserRecord>(&sql)
                .bind(value)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(User::from_record))
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn insert(&self, session: &Session) -> DbResult<()> {
        let r = session.to_record();
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO sessions (
                    id, user_id, ip, agent, refresh_token,
                    active, expires_at, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&r.id)
            .bind(&r.user_id)
            .bind(&r.ip)
            .bind(&r.agent)
            .bind(&r.refresh_token)
            .bind(r.active)
            .bind(r.expires_at)
            .bind(r.created_at)
            .bind(r.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> DbResult<()> {
        let r = session.to_record();
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO sessions (
                    id, user_id, ip, agent, refresh_token,
                    active, expires_at, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (id) DO UPDATE SET
                    ip = EXCLUDED.ip,
                    agent = EXCLUDED.agent,
                    refresh_token = EXCLUDED.refresh_token,
                    active = EXCLUDED.active,
                    expires_at = EXCLUDED.expires_at,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(&r.id)
            .bind(&r.user_id)
            .bind(&r.ip)
            .bind(&r.agent)
            .bind(&r.refresh_token)
            .bind(r.active)
            .bind(r.expires_at)
            .bind(r.created_at)
            .bind(r.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &SessionId) -> DbResult<Option<Session>> {
        self.fetch_session("id = $1", id.as_str()).await
    }

    async fn get_by_refresh_token(&self, refresh_token: &str) -> DbResult<Option<Session>> {
        self.fetch_session("refresh_token = $1", refresh_token).await
    }

    async fn get_active_by_user_id(&self, user_id: &UserId) -> DbResult<Option<Session>> {
        self.fetch_session(
            "user_id = $1 AND active ORDER BY created_at DESC LIMIT 1",
            user_id.as_str(),
        )
        .await
    }

    async fn get_all_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = with_timeout(
            self.timeout,
            sqlx::query_as::<_, SessionRecord>(&sql)
                .bind(user_id.as_str())
                .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.into_iter().map(Session::from_record).collect())
    }

    async fn deactivate_all(&self, user_id: &UserId) -> DbResult<u64> {
        let result = with_timeout(
            self.timeout,
            sqlx::query(
                "UPDATE sessions SET active = false, updated_at = now() \
                 WHERE user_id = $1 AND active",
            )
            .bind(user_id.as_str())
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &SessionId) -> DbResult<()> {
        with_timeout(
            self.timeout,
            sqlx::query("DELETE FROM sessions WHERE id = $1")
                .bind(id.as_str())
                .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn insert(&self, user: &User) -> DbResult<()> {
        let r = user.to_record();
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO users (
                    id, name, username, email, password, avatar_url,
                    enabled, locked, activated_at, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(&r.id)
            .bind(&r.name)
            .bind(&r.username)
            .bind(&r.email)
            .bind(&r.password)
            .bind(&r.avatar_url)
            .bind(r.enabled)
            .bind(r.locked)
            .bind(r.activated_at)
            .bind(r.created_at)
            .bind(r.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn update(&self, user: &User) -> DbResult<()> {
        let r = user.to_record();
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                UPDATE users SET
                    name = $2,
                    username = $3,
                    email = $4,
                    password = $5,
                    avatar_url = $6,
                    enabled = $7,
                    locked = $8,
                    activated_at = $9,
                    updated_at = $10
                WHERE id = $1
                "#,
            )
            .bind(&r.id)
            .bind(&r.name)
            .bind(&r.username)
            .bind(&r.email)
            .bind(&r.password)
            .bind(&r.avatar_url)
            .bind(r.enabled)
            .bind(r.locked)
            .bind(r.activated_at)
            .bind(r.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &UserId) -> DbResult<Option<User>> {
        self.fetch_user("id", id.as_str()).await
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.fetch_user("email", email).await
    }

    async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.fetch_user("username", username).await
    }
}
