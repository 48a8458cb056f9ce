//! Stop Service

use std::sync::Arc;

use kernel::id::StopId;

use crate::application::config::StopConfig;
use crate::domain::entity::{Stop, StopChanges};
use crate::domain::repository::StopRepository;
use crate::error::{StopError, StopResult};

/// Create stop input
pub struct CreateStopInput {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub security_rating: i32,
}

pub struct StopService<R> {
    repo: Arc<R>,
    config: Arc<StopConfig>,
}

impl<R> Clone for StopService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R> StopService<R>
where
    R: StopRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<StopConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn create_stop(&self, input: CreateStopInput) -> StopResult<Stop> {
        let stop = Stop::new(
            input.name,
            input.latitude,
            input.longitude,
            input.security_rating,
            self.config.geofence.as_ref(),
        )?;

        self.repo
            .insert(&stop)
            .await
            .map_err(StopError::storage("failed to create stop"))?;

        tracing::info!(stop_id = %stop.id, slug = %stop.slug, "Stop created");
        Ok(stop)
    }

    pub async fn get_stop_by_id(&self, id: &StopId) -> StopResult<Stop> {
        self.repo
            .get_by_id(id)
            .await
            .map_err(StopError::storage("failed to retrieve stop"))?
            .ok_or_else(|| {
                tracing::info!(stop_id = %id, "Stop not found");
                StopError::NotFound
            })
    }

    pub async fn get_stop_by_slug(&self, slug: &str) -> StopResult<Stop> {
        self.repo
            .get_by_slug(slug)
            .await
            .map_err(StopError::storage("failed to retrieve stop"))?
            .ok_or_else(|| {
                tracing::info!(slug, "Stop not found");
                StopError::NotFound
            })
    }

    pub async fn list_stops(&self) -> StopResult<Vec<Stop>> {
        self.repo
            .list_active()
            .await
            .map_err(StopError::storage("failed to list stops"))
    }

    pub async fn update_stop(&self, id: &StopId, changes: StopChanges) -> StopResult<Stop> {
        let mut stop = self.get_stop_by_id(id).await?;
        stop.apply(changes, self.config.geofence.as_ref())?;

        self.repo
            .update(&stop)
            .await
            .map_err(StopError::storage("failed to update stop"))?;

        tracing::info!(stop_id = %stop.id, slug = %stop.slug, "Stop updated");
        Ok(stop)
    }

    /// Soft delete.
    pub async fn inactivate_stop(&self, id: &StopId) -> StopResult<()> {
        let touched = self
            .repo
            .inactivate(id)
            .await
            .map_err(StopError::storage("failed to inactivate stop"))?;
        if !touched {
            return Err(StopError::NotFound);
        }

        tracing::info!(stop_id = %id, "Stop inactivated");
        Ok(())
    }
}
