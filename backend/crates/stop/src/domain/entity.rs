//! Stop Entity
//!
//! A pick-up point on campus. Name, coordinates and security rating are
//! validated together; the slug follows the name.

use chrono::{DateTime, Utc};
use kernel::id::StopId;

use crate::domain::model::StopRecord;
use crate::domain::value_object::{GeoFence, Slug, check_latitude, check_longitude};
use crate::error::{StopError, StopResult};

pub const SECURITY_RATING_MAX: i32 = 5;
const NAME_MAX_LENGTH: usize = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub slug: Slug,
    pub latitude: f64,
    pub longitude: f64,
    /// 0 (avoid) to 5 (safe)
    pub security_rating: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct StopChanges {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub security_rating: Option<i32>,
}

impl Stop {
    pub fn new(
        name: impl AsRef<str>,
        latitude: f64,
        longitude: f64,
        security_rating: i32,
        fence: Option<&GeoFence>,
    ) -> StopResult<Self> {
        let name = name.as_ref().trim().to_string();
        check_name(&name)?;

        let now = Utc::now();
        let stop = Self {
            id: StopId::new(),
            slug: Slug::from_name(&name)?,
            name,
            latitude,
            longitude,
            security_rating,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        stop.validate(fence)?;
        Ok(stop)
    }

    /// Apply `changes` all or nothing. A rename re-derives the slug.
    pub fn apply(&mut self, changes: StopChanges, fence: Option<&GeoFence>) -> StopResult<()> {
        let mut next = self.clone();
        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            check_name(&name)?;
            next.slug = Slug::from_name(&name)?;
            next.name = name;
        }
        if let Some(latitude) = changes.latitude {
            next.latitude = latitude;
        }
        if let Some(longitude) = changes.longitude {
            next.longitude = longitude;
        }
        if let Some(rating) = changes.security_rating {
            next.security_rating = rating;
        }
        next.validate(fence)?;

        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }

    fn validate(&self, fence: Option<&GeoFence>) -> StopResult<()> {
        check_latitude(self.latitude)?;
        check_longitude(self.longitude)?;

        if !(0..=SECURITY_RATING_MAX).contains(&self.security_rating) {
            return Err(StopError::InvalidEntity(format!(
                "security rating must be between 0 and {SECURITY_RATING_MAX}"
            )));
        }

        if let Some(fence) = fence {
            if !fence.contains(self.latitude, self.longitude) {
                return Err(StopError::InvalidEntity(
                    "stop is outside the service area".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn to_record(&self) -> StopRecord {
        StopRecord {
            id: self.id.to_string(),
            name: self.name.clone(),
            slug: self.slug.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            security_rating: self.security_rating,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_record(record: StopRecord) -> Self {
        Self {
            id: StopId::from_db(record.id),
            name: record.name,
            slug: Slug::from_db(record.slug),
            latitude: record.latitude,
            longitude: record.longitude,
            security_rating: record.security_rating,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

fn check_name(name: &str) -> StopResult<()> {
    if name.is_empty() {
        return Err(StopError::InvalidEntity("name is required".into()));
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(StopError::InvalidEntity(format!(
            "name must be at most {NAME_MAX_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus() -> GeoFence {
        GeoFence::new(-13.1, -38.6, -12.9, -38.4).unwrap()
    }

    #[test]
    fn test_new_stop() {
        let stop = Stop::new(" Praça da Sé ", -12.97, -38.51, 4, None).unwrap();
        assert_eq!(stop.name, "Praça da Sé");
        assert_eq!(stop.slug.as_str(), "praca-da-se");
        assert!(stop.is_active);
        assert!(stop.id.as_str().starts_with("stop_"));
    }

    #[test]
    fn test_validation_failures_are_invalid_entity() {
        let cases = [
            Stop::new("", 0.0, 0.0, 3, None),
            Stop::new("   ", 0.0, 0.0, 3, None),
            Stop::new("###", 0.0, 0.0, 3, None),
            Stop::new("Ondina", 91.0, 0.0, 3, None),
            Stop::new("Ondina", 0.0, -181.0, 3, None),
            Stop::new("Ondina", 0.0, 0.0, -1, None),
            Stop::new("Ondina", 0.0, 0.0, 6, None),
        ];
        for result in cases {
            assert!(matches!(result, Err(StopError::InvalidEntity(_))));
        }
    }

    #[test]
    fn test_geofence_applies() {
        let fence = campus();
        assert!(Stop::new("Ondina", -13.0, -38.5, 3, Some(&fence)).is_ok());
        assert!(Stop::new("Ondina", -13.1, -38.6, 3, Some(&fence)).is_ok());

        let err = Stop::new("Feira", -12.26, -38.96, 3, Some(&fence)).unwrap_err();
        assert_eq!(err.to_string(), "stop is outside the service area");
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let fence = campus();
        let mut stop = Stop::new("Ondina", -13.0, -38.5, 3, Some(&fence)).unwrap();
        let before = stop.clone();

        let err = stop.apply(
            StopChanges {
                name: Some("Ondina Nova".into()),
                latitude: Some(-12.0),
                ..Default::default()
            },
            Some(&fence),
        );
        assert!(err.is_err());
        assert_eq!(stop, before);

        stop.apply(
            StopChanges {
                name: Some("Ondina Nova".into()),
                security_rating: Some(5),
                ..Default::default()
            },
            Some(&fence),
        )
        .unwrap();
        assert_eq!(stop.slug.as_str(), "ondina-nova");
        assert_eq!(stop.security_rating, 5);
        assert_eq!(stop.latitude, before.latitude);
    }

    #[test]
    fn test_record_round_trip() {
        let stop = Stop::new("Reitoria", -12.99, -38.52, 2, None).unwrap();
        assert_eq!(Stop::from_record(stop.to_record()), stop);
    }
}
