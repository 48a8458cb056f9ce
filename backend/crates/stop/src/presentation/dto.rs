//! API DTOs

use chrono::{DateTime, Utc};
use kernel::id::StopId;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Stop, StopChanges};

/// Create stop request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStopRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(alias = "security")]
    pub security_rating: i32,
}

/// Update stop request; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStopRequest {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(alias = "security")]
    pub security_rating: Option<i32>,
}

impl From<UpdateStopRequest> for StopChanges {
    fn from(req: UpdateStopRequest) -> Self {
        Self {
            name: req.name,
            latitude: req.latitude,
            longitude: req.longitude,
            security_rating: req.security_rating,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StopResponse {
    pub id: StopId,
    pub name: String,
    pub slug: String,
    pub latitude: f64,
    pub longitude: f64,
    pub security_rating: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Stop> for StopResponse {
    fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id.clone(),
            name: stop.name.clone(),
            slug: stop.slug.to_string(),
            latitude: stop.latitude,
            longitude: stop.longitude,
            security_rating: stop.security_rating,
            is_active: stop.is_active,
            created_at: stop.created_at,
            updated_at: stop.updated_at,
        }
    }
}
