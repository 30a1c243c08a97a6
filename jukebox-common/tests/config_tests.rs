//! Configuration loading and root folder resolution
//!
//! Tests that touch `JUKEBOX_ROOT_FOLDER` are marked `#[serial]` so they
//! don't race on the process environment.

use jukebox_common::config::{
    load_toml_config, resolve_root_folder, write_toml_config, RootFolderInitializer, TomlConfig,
    ENV_ROOT_FOLDER,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_missing_config_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = load_toml_config(&temp.path().join("absent.toml")).unwrap();

    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.auth.access_token_ttl_secs, 900);
    assert_eq!(config.auth.bcrypt_cost, 10);
    assert!(config.musicbrainz.enabled);
    assert_eq!(config.musicbrainz.min_interval_ms, 1000);
}

#[test]
fn test_partial_config_keeps_defaults_for_missing_fields() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
port = 8080

[auth]
access_token_ttl_secs = 60

[musicbrainz]
enabled = false
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.auth.access_token_ttl_secs, 60);
    assert_eq!(config.auth.bcrypt_cost, 10);
    assert!(!config.musicbrainz.enabled);
    assert_eq!(config.musicbrainz.base_url, "https://musicbrainz.org/ws/2");
}

#[test]
fn test_malformed_config_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_write_then_load_preserves_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");

    let mut config = TomlConfig::default();
    config.root_folder = Some(PathBuf::from("/srv/jukebox"));
    config.media_base_url = Some("https://cdn.example.com".to_string());
    write_toml_config(&config, &path).unwrap();

    assert!(!path.with_extension("toml.tmp").exists(), "temp file should be renamed away");

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded.root_folder, Some(PathBuf::from("/srv/jukebox")));
    assert_eq!(loaded.media_base_url.as_deref(), Some("https://cdn.example.com"));
}

#[test]
#[serial]
fn test_cli_argument_wins_over_env_and_toml() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/jukebox-env-root");
    let mut config = TomlConfig::default();
    config.root_folder = Some(PathBuf::from("/tmp/jukebox-toml-root"));

    let resolved = resolve_root_folder(Some(Path::new("/tmp/jukebox-cli-root")), &config);
    assert_eq!(resolved, PathBuf::from("/tmp/jukebox-cli-root"));

    env::remove_var(ENV_ROOT_FOLDER);
}

#[test]
#[serial]
fn test_env_wins_over_toml() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/jukebox-env-root");
    let mut config = TomlConfig::default();
    config.root_folder = Some(PathBuf::from("/tmp/jukebox-toml-root"));

    assert_eq!(
        resolve_root_folder(None, &config),
        PathBuf::from("/tmp/jukebox-env-root")
    );

    env::remove_var(ENV_ROOT_FOLDER);
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(ENV_ROOT_FOLDER);

    let mut config = TomlConfig::default();
    config.root_folder = Some(PathBuf::from("/tmp/jukebox-toml-root"));
    assert_eq!(
        resolve_root_folder(None, &config),
        PathBuf::from("/tmp/jukebox-toml-root")
    );

    let fallback = resolve_root_folder(None, &TomlConfig::default());
    assert!(fallback.ends_with("jukebox") || fallback.ends_with("jukebox_data"));
}

#[test]
fn test_initializer_creates_upload_layout() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let initializer = RootFolderInitializer::new(root.clone());

    initializer.ensure_directory_exists().unwrap();
    // Safe to call again
    initializer.ensure_directory_exists().unwrap();

    assert!(root.join("uploads").join("songs").is_dir());
    assert!(root.join("uploads").join("thumbnails").is_dir());
    assert_eq!(initializer.database_path(), root.join("jukebox.db"));
}
