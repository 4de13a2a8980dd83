//! SearchStops query handler.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::StopDirectory;

/// Shorter fragments match too much of the directory.
pub const MIN_FRAGMENT_LEN: usize = 3;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct SearchStopsQuery {
    pub fragment: String,
    pub limit: Option<usize>,
}

pub struct SearchStopsHandler {
    directory: Arc<dyn StopDirectory>,
    call_timeout: Duration,
}

impl SearchStopsHandler {
    pub fn new(directory: Arc<dyn StopDirectory>, call_timeout: Duration) -> Self {
        Self {
            directory,
            call_timeout,
        }
    }

    /// Unique stop names containing the fragment, ignoring case.
    pub async fn handle(&self, query: SearchStopsQuery) -> Result<Vec<String>, DomainError> {
        let fragment = query.fragment.trim();
        if fragment.chars().count() < MIN_FRAGMENT_LEN {
            return Err(DomainError::validation(
                "query",
                format!("query must be at least {} characters", MIN_FRAGMENT_LEN),
            ));
        }

        let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1);
        let found = tokio::time::timeout(self.call_timeout, self.directory.search(fragment, limit))
            .await
            .map_err(|_| DomainError::new(ErrorCode::Timeout, "stop search timed out"))?;

        found.map_err(|e| {
            tracing::error!(fragment, error = %e, "Stop search failed");
            DomainError::new(ErrorCode::DatabaseError, e.to_string())
        })
    }
}
