//! jukebox-server - music library REST service
//!
//! Startup order:
//! 1. Parse CLI (with `JUKEBOX_*` env fallbacks) and load the TOML config
//! 2. Initialize tracing and log build identification
//! 3. Resolve and create the root folder, open the database
//! 4. Load or generate the access token signing secret
//! 5. Serve the router

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jukebox_common::config::{self, RootFolderInitializer, TomlConfig};
use jukebox_common::db::{init_database, load_or_init_jwt_secret};
use jukebox_server::metadata::MusicBrainzClient;
use jukebox_server::{build_router, AppState, ServerSettings};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MEDIA_BASE_URL: &str = "https://media.example.com";

#[derive(Parser, Debug)]
#[command(name = "jukebox-server")]
#[command(about = "Music library REST service")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config_dir>/jukebox/config.toml)
    #[arg(short, long, env = "JUKEBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the database and uploaded files
    #[arg(short, long, env = "JUKEBOX_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "JUKEBOX_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "JUKEBOX_PORT")]
    port: Option<u16>,

    /// Log level when RUST_LOG is unset (e.g. "info", "jukebox_server=debug")
    #[arg(long, env = "JUKEBOX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Disable MusicBrainz lookups during upload
    #[arg(long, env = "JUKEBOX_OFFLINE")]
    offline: bool,
}

fn init_tracing(level: &str, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the TOML layer; a broken file falls back to defaults
fn load_config(path: Option<&PathBuf>) -> (TomlConfig, Option<String>) {
    let Some(path) = path.cloned().or_else(config::default_config_path) else {
        return (TomlConfig::default(), None);
    };

    match config::load_toml_config(&path) {
        Ok(config) => (config, None),
        Err(e) => (TomlConfig::default(), Some(e.to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing is not up yet, so config problems are reported right after init
    let (toml_config, config_error) = load_config(args.config.as_ref());

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());
    init_tracing(&level, toml_config.logging.file.as_ref())?;

    info!(
        "Starting jukebox-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(e) = config_error {
        warn!("Ignoring config file: {} (using defaults)", e);
    }

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let initializer = RootFolderInitializer::new(root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", root_folder.display());

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db = init_database(&db_path).await?;

    let jwt_secret = match toml_config.auth.jwt_secret.clone().filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => load_or_init_jwt_secret(&db).await?,
    };

    let musicbrainz = if toml_config.musicbrainz.enabled && !args.offline {
        match MusicBrainzClient::new(&toml_config.musicbrainz) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("MusicBrainz client unavailable, using embedded tags only: {}", e);
                None
            }
        }
    } else {
        info!("MusicBrainz lookups disabled");
        None
    };

    let settings = ServerSettings {
        root_folder,
        jwt_secret,
        access_token_ttl_secs: toml_config.auth.access_token_ttl_secs,
        bcrypt_cost: toml_config.auth.bcrypt_cost,
        media_base_url: toml_config
            .media_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_MEDIA_BASE_URL.to_string()),
        musicbrainz,
    };

    let state = AppState::new(db, settings);
    let app = build_router(state);

    let bind = args
        .bind
        .or(toml_config.bind_address)
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
