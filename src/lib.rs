//! Transit Guide - Conversational Public Transport Trip Planner
//!
//! A dialogue engine that collects a destination, an origin and a departure
//! date and time from free-text messages, resolves place names to stops and
//! fetches itineraries from an Open Journey Planner endpoint.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
