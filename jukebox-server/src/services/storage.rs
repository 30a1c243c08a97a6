//! Upload storage under the root folder
//!
//! Stored paths are relative to the root folder and name a file directly
//! inside one upload directory (`uploads/songs/<name>` for audio,
//! `uploads/thumbnails/<name>` for covers). Nothing else under the root,
//! the database included, is reachable through a stored path.

use jukebox_common::config::RootFolderInitializer;
use rand::Rng;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Which upload directory a file goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Song,
    Thumbnail,
}

impl UploadKind {
    fn relative_dir(self) -> &'static str {
        match self {
            UploadKind::Song => "uploads/songs",
            UploadKind::Thumbnail => "uploads/thumbnails",
        }
    }
}

/// Upload directories under the root folder
#[derive(Debug, Clone)]
pub struct Storage {
    layout: RootFolderInitializer,
}

/// Normalize a client-supplied stored path
///
/// Accepts only `<upload dir>/<file name>` for the directory of `kind`;
/// backslashes count as separators.
pub fn stored_path(kind: UploadKind, stored: &str) -> Option<String> {
    let normalized = stored.trim().replace('\\', "/");
    let relative = Path::new(&normalized);

    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    let inside = relative.parent() == Some(Path::new(kind.relative_dir()));

    (plain && inside && !normalized.ends_with('/')).then_some(normalized)
}

/// `<unix_millis>-<random 0..1e9><original extension>`
pub fn unique_file_name(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);

    format!("{}-{}{}", jukebox_common::time::unix_millis(), suffix, extension)
}

impl Storage {
    pub fn new(root_folder: PathBuf) -> Self {
        Self {
            layout: RootFolderInitializer::new(root_folder),
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root_folder()
    }

    /// Create the upload directories if missing
    pub fn ensure_directories(&self) -> jukebox_common::Result<()> {
        self.layout.ensure_directory_exists()
    }

    /// Open a new file for an upload
    ///
    /// Returns the relative path to store and the open file.
    pub async fn create(
        &self,
        kind: UploadKind,
        original_name: &str,
    ) -> std::io::Result<(String, PathBuf, tokio::fs::File)> {
        let dir = match kind {
            UploadKind::Song => self.layout.songs_dir(),
            UploadKind::Thumbnail => self.layout.thumbnails_dir(),
        };
        tokio::fs::create_dir_all(&dir).await?;

        let name = unique_file_name(original_name);
        let absolute = dir.join(&name);
        let file = tokio::fs::File::create(&absolute).await?;

        Ok((format!("{}/{}", kind.relative_dir(), name), absolute, file))
    }

    /// Map a stored path back to its file under the root folder
    ///
    /// `None` unless the path names a file inside `kind`'s upload directory.
    pub fn resolve(&self, kind: UploadKind, stored: &str) -> Option<PathBuf> {
        stored_path(kind, stored).map(|relative| self.root().join(relative))
    }

    /// Delete a stored file, ignoring failures
    pub async fn remove(&self, kind: UploadKind, stored: &str) {
        let Some(path) = self.resolve(kind, stored) else {
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(file = %path.display(), "Removed stored file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(file = %path.display(), error = %e, "Failed to remove stored file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unique_file_name_keeps_extension() {
        let name = unique_file_name("My Song.MP3");
        assert!(name.ends_with(".MP3"));

        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        let random = rest.trim_end_matches(".MP3");
        assert!(random.parse::<u32>().unwrap() < 1_000_000_000);
    }

    #[test]
    fn test_unique_file_name_without_extension() {
        let name = unique_file_name("README");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let storage = Storage::new(PathBuf::from("/srv/jukebox"));

        assert_eq!(
            storage.resolve(UploadKind::Song, "uploads/songs/a.mp3"),
            Some(PathBuf::from("/srv/jukebox/uploads/songs/a.mp3"))
        );
        assert_eq!(
            storage.resolve(UploadKind::Song, "uploads\\songs\\a.mp3"),
            Some(PathBuf::from("/srv/jukebox/uploads/songs/a.mp3"))
        );
        assert!(storage.resolve(UploadKind::Song, "../etc/passwd").is_none());
        assert!(storage.resolve(UploadKind::Song, "uploads/songs/../../jukebox.db").is_none());
        assert!(storage.resolve(UploadKind::Song, "/etc/passwd").is_none());
        assert!(storage.resolve(UploadKind::Song, "").is_none());
    }

    #[test]
    fn test_stored_path_stays_in_upload_dir() {
        assert!(stored_path(UploadKind::Song, "jukebox.db").is_none());
        assert!(stored_path(UploadKind::Song, "./uploads/songs/a.mp3").is_none());
        assert!(stored_path(UploadKind::Song, "uploads/songs").is_none());
        assert!(stored_path(UploadKind::Song, "uploads/songs/").is_none());
        assert!(stored_path(UploadKind::Song, "uploads/songs/nested/a.mp3").is_none());
        assert!(stored_path(UploadKind::Song, "uploads/thumbnails/a.png").is_none());
        assert!(stored_path(UploadKind::Thumbnail, "uploads/songs/a.mp3").is_none());

        assert_eq!(
            stored_path(UploadKind::Thumbnail, " uploads/thumbnails/a.png ").as_deref(),
            Some("uploads/thumbnails/a.png")
        );
    }

    #[tokio::test]
    async fn test_create_and_remove() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().to_path_buf());

        let (relative, absolute, file) = storage
            .create(UploadKind::Thumbnail, "cover.png")
            .await
            .unwrap();
        drop(file);

        assert!(relative.starts_with("uploads/thumbnails/"));
        assert!(relative.ends_with(".png"));
        assert_eq!(storage.resolve(UploadKind::Thumbnail, &relative).unwrap(), absolute);
        assert!(absolute.exists());

        // Wrong kind never touches the file
        storage.remove(UploadKind::Song, &relative).await;
        assert!(absolute.exists());

        storage.remove(UploadKind::Thumbnail, &relative).await;
        assert!(!absolute.exists());

        // Second removal is a no-op
        storage.remove(UploadKind::Thumbnail, &relative).await;
    }
}
