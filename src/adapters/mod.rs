//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - language model providers (OpenAI, mock)
//! - `geocoding` - place name to coordinates (Nominatim, mock)
//! - `stops` - GTFS stop directory (PostgreSQL, in-memory)
//! - `ojp` - trip planning over OJP XML (HTTP, mock)
//! - `storage` - dialogue session store
//! - `http` - inbound REST API

pub mod ai;
pub mod geocoding;
pub mod http;
pub mod ojp;
pub mod stops;
pub mod storage;
