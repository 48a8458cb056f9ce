//! Stop application configuration

use std::time::Duration;

use platform::db::DEFAULT_QUERY_TIMEOUT;

use crate::domain::value_object::GeoFence;

#[derive(Debug, Clone)]
pub struct StopConfig {
    /// Per-call ceiling for repository calls
    pub query_timeout: Duration,
    /// Service area; `None` accepts any valid coordinate
    pub geofence: Option<GeoFence>,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            geofence: None,
        }
    }
}
