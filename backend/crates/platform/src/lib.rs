//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Bearer token codec (HS256 JWT)
//! - Password hashing (Argon2id with tunable cost)
//! - Cache-aside store abstraction (Redis, in-memory)
//! - Database call timeouts and constraint-violation parsing
//! - Client identification from HTTP headers

pub mod cache;
pub mod client;
pub mod db;
pub mod password;
pub mod token;
