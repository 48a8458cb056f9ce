//! Repository Traits

use kernel::id::StopId;
use platform::db::DbResult;

use crate::domain::entity::Stop;

/// Stop repository trait
///
/// Reads only see active stops; inactive rows are kept for history.
#[trait_variant::make(StopRepository: Send)]
pub trait LocalStopRepository {
    async fn insert(&self, stop: &Stop) -> DbResult<()>;

    async fn update(&self, stop: &Stop) -> DbResult<()>;

    async fn get_by_id(&self, id: &StopId) -> DbResult<Option<Stop>>;

    async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Stop>>;

    /// Active stops ordered by name.
    async fn list_active(&self) -> DbResult<Vec<Stop>>;

    /// Returns false when no active stop had this id.
    async fn inactivate(&self, id: &StopId) -> DbResult<bool>;
}
