//! Data models for the station catalog, observation files and API bodies.

/// Yearly and seasonal climate table
pub mod climate;
/// Daily observations and monthly/yearly aggregates
pub mod observation;
/// Station catalog entries
pub mod station;
