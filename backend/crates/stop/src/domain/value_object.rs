//! Stop Value Objects
//!
//! `Slug` is the URL handle derived from a stop's name. `GeoFence` is the
//! bounding box every stop must lie in when one is configured.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{StopError, StopResult};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

// ============================================================================
// Slug
// ============================================================================

/// Lower-case ASCII handle: `"Praça da Sé"` → `"praca-da-se"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    /// Accents are dropped, any other run of non-alphanumerics becomes one `-`.
    /// Fails when nothing alphanumeric is left.
    pub fn from_name(name: &str) -> StopResult<Self> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;

        for c in name.nfkd().filter(|c| !is_combining_mark(*c)) {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }

        if slug.is_empty() {
            return Err(StopError::InvalidEntity(
                "name must contain at least one letter or digit".into(),
            ));
        }
        Ok(Self(slug))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// GeoFence
// ============================================================================

/// Inclusive latitude/longitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoFence {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> StopResult<Self> {
        check_latitude(min_lat)?;
        check_latitude(max_lat)?;
        check_longitude(min_lon)?;
        check_longitude(max_lon)?;
        if min_lat > max_lat || min_lon > max_lon {
            return Err(StopError::Validation(
                "geofence minimum must not exceed its maximum".into(),
            ));
        }
        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

/// `"min_lat,min_lon,max_lat,max_lon"`
impl FromStr for GeoFence {
    type Err = StopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StopError::Validation(format!("invalid geofence coordinate: {e}")))?;

        match parts.as_slice() {
            &[min_lat, min_lon, max_lat, max_lon] => Self::new(min_lat, min_lon, max_lat, max_lon),
            _ => Err(StopError::Validation(
                "geofence must be min_lat,min_lon,max_lat,max_lon".into(),
            )),
        }
    }
}

pub(crate) fn check_latitude(latitude: f64) -> StopResult<()> {
    let (min, max) = LATITUDE_RANGE;
    if !(min..=max).contains(&latitude) {
        return Err(StopError::InvalidEntity(
            "latitude must be between -90 and 90".into(),
        ));
    }
    Ok(())
}

pub(crate) fn check_longitude(longitude: f64) -> StopResult<()> {
    let (min, max) = LONGITUDE_RANGE;
    if !(min..=max).contains(&longitude) {
        return Err(StopError::InvalidEntity(
            "longitude must be between -180 and 180".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_name() {
        let slug = |name: &str| Slug::from_name(name).unwrap().to_string();
        assert_eq!(slug("Praça da Sé"), "praca-da-se");
        assert_eq!(slug("  Ondina / Portão 2 "), "ondina-portao-2");
        assert_eq!(slug("PAF--I"), "paf-i");
        assert_eq!(slug("Reitoria"), "reitoria");
        assert!(matches!(
            Slug::from_name("!!! ---"),
            Err(StopError::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_geofence_is_inclusive() {
        let fence = GeoFence::new(-13.1, -38.6, -12.9, -38.4).unwrap();
        assert!(fence.contains(-13.0, -38.5));
        assert!(fence.contains(-13.1, -38.6));
        assert!(fence.contains(-12.9, -38.4));
        assert!(!fence.contains(-12.89, -38.5));
        assert!(!fence.contains(-13.0, -38.39));
    }

    #[test]
    fn test_geofence_parse() {
        let fence: GeoFence = "-13.1, -38.6, -12.9, -38.4".parse().unwrap();
        assert_eq!(fence.min_lat, -13.1);
        assert_eq!(fence.max_lon, -38.4);

        assert!("1,2,3".parse::<GeoFence>().is_err());
        assert!("a,b,c,d".parse::<GeoFence>().is_err());
        assert!("10,0,-10,5".parse::<GeoFence>().is_err());
        assert!("-91,0,0,5".parse::<GeoFence>().is_err());
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(check_latitude(90.0).is_ok());
        assert!(check_latitude(-90.0).is_ok());
        assert!(check_latitude(90.0001).is_err());
        assert!(check_latitude(f64::NAN).is_err());
        assert!(check_longitude(180.0).is_ok());
        assert!(check_longitude(-180.5).is_err());
    }
}
