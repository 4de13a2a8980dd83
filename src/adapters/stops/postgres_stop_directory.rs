//! PostgreSQL implementation of StopDirectory.
//!
//! Reads the GTFS `stops` table loaded by the reference-data import:
//! `stop_id TEXT, stop_name TEXT, stop_lat DOUBLE PRECISION, stop_lon DOUBLE PRECISION`.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::transit::{Coordinates, Stop, StopId};
use crate::ports::{StopDirectory, StopDirectoryError};

/// PostgreSQL implementation of the StopDirectory port.
pub struct PostgresStopDirectory {
    pool: PgPool,
}

impl PostgresStopDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StopRow {
    stop_id: String,
    stop_name: String,
    stop_lat: f64,
    stop_lon: f64,
}

impl TryFrom<StopRow> for Stop {
    type Error = StopDirectoryError;

    fn try_from(row: StopRow) -> Result<Self, Self::Error> {
        let id = StopId::new(row.stop_id)
            .map_err(|e| StopDirectoryError::Malformed(format!("stop_id: {}", e)))?;
        let coordinates = Coordinates::new(row.stop_lat, row.stop_lon)
            .map_err(|e| StopDirectoryError::Malformed(format!("{}: {}", row.stop_name, e)))?;
        Ok(Stop::new(id, row.stop_name, coordinates))
    }
}

/// Escapes `%`, `_` and `\` so a user fragment matches literally in `ILIKE`.
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn query_error(context: &str, e: sqlx::Error) -> StopDirectoryError {
    StopDirectoryError::Query(format!("{}: {}", context, e))
}

#[async_trait]
impl StopDirectory for PostgresStopDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Option<Stop>, StopDirectoryError> {
        let row: Option<StopRow> = sqlx::query_as(
            r#"
            SELECT stop_id, stop_name, stop_lat, stop_lon
            FROM stops
            WHERE lower(stop_name) = lower($1)
            ORDER BY stop_id
            LIMIT 1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to find stop by name", e))?;

        row.map(Stop::try_from).transpose()
    }

    async fn nearest_to(&self, point: Coordinates) -> Result<Option<Stop>, StopDirectoryError> {
        // Equirectangular distance is monotonic enough at city scale for ordering.
        let row: Option<StopRow> = sqlx::query_as(
            r#"
            SELECT stop_id, stop_name, stop_lat, stop_lon
            FROM stops
            ORDER BY
                power(stop_lat - $1, 2)
                + power((stop_lon - $2) * cos(radians($1)), 2)
            LIMIT 1
            "#,
        )
        .bind(point.latitude)
        .bind(point.longitude)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to find nearest stop", e))?;

        row.map(Stop::try_from).transpose()
    }

    async fn search(&self, fragment: &str, limit: usize) -> Result<Vec<String>, StopDirectoryError> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT stop_name
            FROM stops
            WHERE stop_name ILIKE $1 ESCAPE '\'
            ORDER BY stop_name
            LIMIT $2
            "#,
        )
        .bind(like_pattern(fragment.trim()))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to search stops", e))?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }
}
