//! Business logic services.
//!
//! Services contain the core logic separated from HTTP handlers.
//! They handle downloads, file processing, caching and search.

pub mod cache_service;
pub mod catalog_service;
pub mod climate_service;
pub mod ghcn_client;
pub mod processing_service;
pub mod search_service;
