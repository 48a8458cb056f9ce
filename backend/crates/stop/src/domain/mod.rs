//! Domain Layer

pub mod entity;
pub mod model;
pub mod repository;
pub mod value_object;

pub use entity::{Stop, StopChanges};
pub use repository::StopRepository;
pub use value_object::{GeoFence, Slug};
