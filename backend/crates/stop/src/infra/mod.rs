//! Infrastructure Layer

pub mod memory;
pub mod postgres;

pub use memory::MemoryStopRepository;
pub use postgres::PgStopRepository;
