//! Query functions, one module per table
//!
//! These functions do no authorization; ownership rules live in
//! `crate::services`.

pub mod comments;
pub mod likes;
pub mod playlists;
pub mod songs;
pub mod users;
