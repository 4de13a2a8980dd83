//! Stop directory adapters.
//!
//! - `PostgresStopDirectory` - GTFS `stops` table via sqlx
//! - `InMemoryStopDirectory` - Fixed list for tests and local runs

mod in_memory_stop_directory;
mod postgres_stop_directory;

pub use in_memory_stop_directory::InMemoryStopDirectory;
pub use postgres_stop_directory::PostgresStopDirectory;
