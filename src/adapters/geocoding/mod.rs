//! Geocoder adapters.
//!
//! - `NominatimGeocoder` - OpenStreetMap Nominatim search API
//! - `MockGeocoder` - Fixed table for tests

mod mock_geocoder;
mod nominatim;

pub use mock_geocoder::MockGeocoder;
pub use nominatim::{NominatimConfig, NominatimGeocoder};
