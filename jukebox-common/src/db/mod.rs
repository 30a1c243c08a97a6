//! Database schema and shared storage helpers

pub mod init;
pub mod settings;

pub use init::{create_schema, init_database, init_memory_database};
pub use settings::{get_setting, load_or_init_jwt_secret, set_setting};
