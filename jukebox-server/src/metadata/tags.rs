//! Embedded tag extraction using lofty

use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagError {
    /// File missing, unreadable or not a recognized audio format
    #[error("Failed to read file: {0}")]
    ReadError(String),
}

/// Tags and duration read from an audio file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_seconds: Option<f64>,
}

fn non_blank(value: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read title/artist/album tags and the stream duration
pub fn read_tags(file_path: &Path) -> Result<AudioTags, TagError> {
    let tagged_file = Probe::open(file_path)
        .map_err(|e| TagError::ReadError(e.to_string()))?
        .read()
        .map_err(|e| TagError::ReadError(e.to_string()))?;

    let duration = tagged_file.properties().duration().as_secs_f64();

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

    let tags = match tag {
        Some(tag) => AudioTags {
            title: non_blank(tag.title()),
            artist: non_blank(tag.artist()),
            album: non_blank(tag.album()),
            duration_seconds: None,
        },
        None => AudioTags::default(),
    };

    let tags = AudioTags {
        duration_seconds: (duration > 0.0).then_some(duration),
        ..tags
    };

    tracing::debug!(
        file = %file_path.display(),
        title = ?tags.title,
        artist = ?tags.artist,
        duration_s = ?tags.duration_seconds,
        "Extracted tags"
    );

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_error() {
        let result = read_tags(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(TagError::ReadError(_))));
    }

    #[test]
    fn test_non_audio_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(read_tags(&path).is_err());
    }
}
