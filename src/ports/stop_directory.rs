//! Stop Directory Port - Read-only access to canonical stops.

use async_trait::async_trait;

use crate::domain::transit::{Coordinates, Stop};

/// Stop directory errors.
#[derive(Debug, thiserror::Error)]
pub enum StopDirectoryError {
    #[error("stop directory query failed: {0}")]
    Query(String),

    #[error("stop directory row is malformed: {0}")]
    Malformed(String),

    #[error("stop directory timed out")]
    Timeout,
}

/// Port for looking up stops in the reference data.
#[async_trait]
pub trait StopDirectory: Send + Sync {
    /// Case-insensitive match on the full stop name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Stop>, StopDirectoryError>;

    /// The stop closest to `point`. `None` only for an empty directory.
    async fn nearest_to(&self, point: Coordinates) -> Result<Option<Stop>, StopDirectoryError>;

    /// Unique stop names containing `fragment`, case-insensitively, sorted.
    async fn search(&self, fragment: &str, limit: usize) -> Result<Vec<String>, StopDirectoryError>;
}
