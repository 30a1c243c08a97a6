//! # Jukebox Common Library
//!
//! Shared code for the jukebox server and client including:
//! - Database schema initialization and row models
//! - API request/response types (the JSON contract between server and client)
//! - Configuration loading
//! - Utility functions

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
