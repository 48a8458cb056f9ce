//! Entity Module

pub mod session;
pub mod user;

pub use session::{Session, SessionSummary};
pub use user::{User, UserSummary};
