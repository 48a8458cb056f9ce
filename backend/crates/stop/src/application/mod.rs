//! Application Layer

pub mod config;
pub mod service;

pub use config::StopConfig;
pub use service::{CreateStopInput, StopService};
