//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (URL params, query string)
//! 2. Calls into the catalog, search or climate services
//! 3. Returns HTTP response (JSON, status code)

/// Per-station climate table
pub mod climate;
/// Service health
pub mod health;
/// Map, search and station lookup
pub mod stations;
