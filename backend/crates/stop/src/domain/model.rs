//! Persistence Models

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub latitude: f64,
    pub longitude: f64,
    pub security_rating: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
