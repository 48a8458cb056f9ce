//! PostgreSQL Repository Implementation

use std::time::Duration;

use kernel::id::StopId;
use platform::db::{DEFAULT_QUERY_TIMEOUT, DbResult, with_timeout};
use sqlx::PgPool;

use crate::domain::entity::Stop;
use crate::domain::model::StopRecord;
use crate::domain::repository::StopRepository;

const STOP_COLUMNS: &str =
    "id, name, slug, latitude, longitude, security_rating, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PgStopRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgStopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch_active(&self, column: &str, value: &str) -> DbResult<Option<Stop>> {
        let sql =
            format!("SELECT {STOP_COLUMNS} FROM stops WHERE {column} = $1 AND is_active LIMIT 1");
        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, StopRecord>(&sql)
                .bind(value)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(Stop::from_record))
    }
}

impl StopRepository for PgStopRepository {
    async fn insert(&self, stop: &Stop) -> DbResult<()> {
        let r = stop.to_record();
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO stops (
                    id, name, slug, latitude, longitude,
                    security_rating, is_active, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&r.id)
            .bind(&r.name)
            .bind(&r.slug)
            .bind(r.latitude)
            .bind(r.longitude)
            .bind(r.security_rating)
            .bind(r.is_active)
            .bind(r.created_at)
            .bind(r.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn update(&self, stop: &Stop) -> DbResult<()> {
        let r = stop.to_record();
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                UPDATE stops SET
                    name = $2,
                    slug = $3,
                    latitude = $4,
                    longitude = $5,
                    security_rating = $6,
                    is_active = $7,
                    updated_at = $8
                WHERE id = $1
                "#,
            )
            .bind(&r.id)
            .bind(&r.name)
            .bind(&r.slug)
            .bind(r.latitude)
            .bind(r.longitude)
            .bind(r.security_rating)
            .bind(r.is_active)
            .bind(r.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &StopId) -> DbResult<Option<Stop>> {
        self.fetch_active("id", id.as_str()).await
    }

    async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Stop>> {
        self.fetch_active("slug", slug).await
    }

    async fn list_active(&self) -> DbResult<Vec<Stop>> {
        let sql = format!("SELECT {STOP_COLUMNS} FROM stops WHERE is_active ORDER BY name, id");
        let rows = with_timeout(
            self.timeout,
            sqlx::query_as::<_, StopRecord>(&sql).fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.into_iter().map(Stop::from_record).collect())
    }

    async fn inactivate(&self, id: &StopId) -> DbResult<bool> {
        let result = with_timeout(
            self.timeout,
            sqlx::query(
                "UPDATE stops SET is_active = false, updated_at = now() \
                 WHERE id = $1 AND is_active",
            )
            .bind(id.as_str())
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
