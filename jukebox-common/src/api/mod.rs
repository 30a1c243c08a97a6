//! API module for the shared HTTP contract
//!
//! Request and response bodies used by both `jukebox-server` (axum handlers)
//! and `jukebox-client` (reqwest calls). Pure data, no HTTP framework
//! dependencies.

pub mod types;

pub use types::*;
