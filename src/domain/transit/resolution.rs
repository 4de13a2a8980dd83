//! Result of mapping a user-supplied place name to a directory stop.

use serde::{Deserialize, Serialize};

use super::{Coordinates, Stop};

/// Which resolution tier produced the stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Case-insensitive full-name match in the directory.
    ExactName,
    /// Geocoded the candidate, then took the closest directory stop.
    NearestToGeocode { point: Coordinates },
}

/// A directory stop together with how it was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStop {
    /// The text the user (via the extractor) asked for.
    pub candidate: String,
    pub stop: Stop,
    pub method: ResolutionMethod,
}

impl ResolvedStop {
    pub fn exact(candidate: impl Into<String>, stop: Stop) -> Self {
        Self {
            candidate: candidate.into(),
            stop,
            method: ResolutionMethod::ExactName,
        }
    }

    pub fn nearest(candidate: impl Into<String>, stop: Stop, point: Coordinates) -> Self {
        Self {
            candidate: candidate.into(),
            stop,
            method: ResolutionMethod::NearestToGeocode { point },
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.method, ResolutionMethod::ExactName)
    }
}
