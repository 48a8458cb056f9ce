//! Stop Backend Module
//!
//! Pick-up points riders can choose from.
//!
//! - `domain/` - `Stop` entity, slug and geofence value objects, repository trait
//! - `application/` - `StopService`
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - `/stops` handlers and router
//!
//! Reads are public. Creating, editing and inactivating a stop need a bearer
//! access token. Inactivated stops disappear from every read but keep their
//! slug reserved.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


pub use application::{CreateStopInput, StopConfig, StopService};
pub use domain::{GeoFence, Stop, StopChanges};
pub use error::{StopError, StopResult};
pub use infra::{MemoryStopRepository, PgStopRepository};
pub use presentation::stop_router;
