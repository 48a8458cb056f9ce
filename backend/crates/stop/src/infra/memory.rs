//! In-memory repository

use std::collections::HashMap;

use kernel::id::StopId;
use platform::db::{DbError, DbResult};
use tokio::sync::RwLock;

use crate::domain::entity::Stop;
use crate::domain::model::StopRecord;
use crate::domain::repository::StopRepository;

/// Slugs stay unique across inactive rows too, as in the `stops` table.
#[derive(Default)]
pub struct MemoryStopRepository {
    rows: RwLock<HashMap<String, StopRecord>>,
}

impl MemoryStopRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn slug_taken(rows: &HashMap<String, StopRecord>, record: &StopRecord) -> bool {
        rows.values()
            .any(|r| r.slug == record.slug && r.id != record.id)
    }
}

impl StopRepository for MemoryStopRepository {
    async fn insert(&self, stop: &Stop) -> DbResult<()> {
        let record = stop.to_record();
        let mut rows = self.rows.write().await;
        if Self::slug_taken(&rows, &record) {
            return Err(DbError::UniqueViolation {
                field: "slug".into(),
            });
        }
        rows.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, stop: &Stop) -> DbResult<()> {
        let record = stop.to_record();
        let mut rows = self.rows.write().await;
        if Self::slug_taken(&rows, &record) {
            return Err(DbError::UniqueViolation {
                field: "slug".into(),
            });
        }
        if let Some(row) = rows.get_mut(&record.id) {
            *row = record;
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &StopId) -> DbResult<Option<Stop>> {
        Ok(self
            .rows
            .read()
            .await
            .get(id.as_str())
            .filter(|r| r.is_active)
            .cloned()
            .map(Stop::from_record))
    }

    async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Stop>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|r| r.slug == slug && r.is_active)
            .cloned()
            .map(Stop::from_record))
    }

    async fn list_active(&self) -> DbResult<Vec<Stop>> {
        let mut records: Vec<StopRecord> = self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(records.into_iter().map(Stop::from_record).collect())
    }

    async fn inactivate(&self, id: &StopId) -> DbResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(id.as_str()) {
            Some(row) if row.is_active => {
                row.is_active = false;
                row.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
