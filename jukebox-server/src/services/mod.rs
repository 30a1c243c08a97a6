//! Business rules between the HTTP handlers and the query layer
//!
//! Ownership checks, validation and multi-statement transactions live here.

pub mod auth;
pub mod comments;
pub mod playlists;
pub mod recommendations;
pub mod search;
pub mod songs;
pub mod storage;
pub mod upload;
pub mod users;
