//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::StopAppState;
pub use router::stop_router;
