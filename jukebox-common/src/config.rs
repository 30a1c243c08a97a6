//! Configuration loading and root folder resolution
//!
//! Settings are resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`JUKEBOX_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment handling lives in the server binary (clap
//! `env` attributes); this module owns the TOML layer and the defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "JUKEBOX_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "jukebox.db";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional in the file; a missing file yields
/// `TomlConfig::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database and uploaded files
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Address the HTTP server binds to (default 127.0.0.1)
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP server port (default 3000)
    #[serde(default)]
    pub port: Option<u16>,

    /// Public base URL used by `GET /media/:id`
    #[serde(default)]
    pub media_base_url: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub musicbrainz: MusicBrainzConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Token and password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens. When absent, a random secret is
    /// generated once and persisted in the `settings` table.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,

    /// bcrypt work factor for stored passwords
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            access_token_ttl_secs: default_access_token_ttl_secs(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

/// External recording lookup used during upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicBrainzConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_musicbrainz_base_url")]
    pub base_url: String,

    #[serde(default = "default_musicbrainz_user_agent")]
    pub user_agent: String,

    /// Minimum spacing between requests (MusicBrainz allows 1 req/s)
    #[serde(default = "default_musicbrainz_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_musicbrainz_base_url(),
            user_agent: default_musicbrainz_user_agent(),
            min_interval_ms: default_musicbrainz_interval_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_access_token_ttl_secs() -> u64 {
    15 * 60
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_musicbrainz_base_url() -> String {
    "https://musicbrainz.org/ws/2".to_string()
}

fn default_musicbrainz_user_agent() -> String {
    format!(
        "Jukebox/{} ( https://github.com/jukebox/jukebox )",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_musicbrainz_interval_ms() -> u64 {
    1000
}

/// Default configuration file path for the platform
///
/// `<config_dir>/jukebox/config.toml`, e.g. `~/.config/jukebox/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jukebox").join("config.toml"))
}

/// Load TOML configuration
///
/// A missing file is not an error: a warning is logged and defaults are
/// returned. A file that exists but does not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {} (using defaults)",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write TOML configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Root folder resolution
///
/// 1. Command-line argument
/// 2. `JUKEBOX_ROOT_FOLDER` environment variable
/// 3. `root_folder` in the TOML config
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
///
/// `~/.local/share/jukebox` on Linux, `~/Library/Application Support/jukebox`
/// on macOS, `%LOCALAPPDATA%\jukebox` on Windows.
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("jukebox"))
        .unwrap_or_else(|| PathBuf::from("./jukebox_data"))
}

/// Creates and describes the on-disk layout under the root folder
///
/// ```text
/// <root>/jukebox.db
/// <root>/uploads/songs/
/// <root>/uploads/thumbnails/
/// ```
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and upload directories if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        for dir in [self.root_folder.clone(), self.songs_dir(), self.thumbnails_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
                info!("Created directory: {}", dir.display());
            }
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// Destination for uploaded audio files
    pub fn songs_dir(&self) -> PathBuf {
        self.root_folder.join("uploads").join("songs")
    }

    /// Destination for uploaded cover images
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root_folder.join("uploads").join("thumbnails")
    }
}
