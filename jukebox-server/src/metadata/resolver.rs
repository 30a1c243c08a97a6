//! Upload metadata resolution
//!
//! Runs once per upload with no retry and no cache:
//! 1. With a non-blank title and lookup enabled, search MusicBrainz and
//!    select a release.
//! 2. Otherwise, or when the lookup fails, read tags from the stored file.
//! 3. The filename stem is the title of last resort.

use std::path::Path;
use tracing::{debug, info};

use super::musicbrainz::{MBError, MusicBrainzClient};
use super::selection::{select_release, ResolvedRecording};
use super::tags::{read_tags, AudioTags};

/// Metadata the new song row is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Whole seconds
    pub duration: Option<i64>,
}

/// Resolves song metadata for uploads
#[derive(Clone)]
pub struct MetadataResolver {
    musicbrainz: Option<MusicBrainzClient>,
}

/// Strip the extension from an uploaded file's original name
pub fn filename_stem(original_name: &str) -> String {
    let name = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[..idx].to_string(),
        _ => name.to_string(),
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl MetadataResolver {
    pub fn new(musicbrainz: Option<MusicBrainzClient>) -> Self {
        Self { musicbrainz }
    }

    /// Resolver that never calls out; tags and filename only
    pub fn offline() -> Self {
        Self { musicbrainz: None }
    }

    /// Resolve metadata for an uploaded audio file
    ///
    /// `stored_path` is the file on disk; `original_name` is the client's
    /// filename, used for the stem fallback.
    pub async fn resolve(
        &self,
        supplied_title: Option<&str>,
        supplied_artist: Option<&str>,
        stored_path: &Path,
        original_name: &str,
    ) -> ResolvedMetadata {
        let title = trimmed(supplied_title);
        let artist = trimmed(supplied_artist).unwrap_or("");

        let looked_up = match (title, &self.musicbrainz) {
            (Some(title), Some(client)) => match lookup(client, title, artist).await {
                Ok(recording) => Some(recording),
                Err(e) => {
                    info!(title = %title, error = %e, "MusicBrainz lookup failed, using file tags");
                    None
                }
            },
            _ => None,
        };

        let resolved = match looked_up {
            Some(recording) => from_recording(recording),
            None => {
                let tags = read_tags(stored_path).unwrap_or_else(|e| {
                    debug!(file = %stored_path.display(), error = %e, "No readable tags");
                    AudioTags::default()
                });
                from_tags(title, tags, original_name)
            }
        };

        finalize(resolved, title, original_name)
    }
}

async fn lookup(
    client: &MusicBrainzClient,
    title: &str,
    artist: &str,
) -> Result<ResolvedRecording, MBError> {
    let recordings = client.search_recordings(title, artist).await?;
    select_release(&recordings).ok_or(MBError::NoReleases)
}

fn from_recording(recording: ResolvedRecording) -> ResolvedMetadata {
    ResolvedMetadata {
        title: recording.title,
        artist: recording.artist,
        album: Some(recording.release).filter(|r| !r.trim().is_empty()),
        duration: recording
            .length_ms
            .map(|ms| (ms as f64 / 1000.0).round() as i64),
    }
}

fn from_tags(supplied_title: Option<&str>, tags: AudioTags, original_name: &str) -> ResolvedMetadata {
    let title = supplied_title
        .map(str::to_string)
        .or(tags.title)
        .unwrap_or_else(|| filename_stem(original_name));

    ResolvedMetadata {
        title,
        artist: tags.artist.unwrap_or_default(),
        album: tags.album,
        duration: tags.duration_seconds.map(|d| d.round() as i64),
    }
}

/// A blank final title falls back to the supplied title or the filename
/// stem, and drops artist and album with it
fn finalize(
    resolved: ResolvedMetadata,
    supplied_title: Option<&str>,
    original_name: &str,
) -> ResolvedMetadata {
    if !resolved.title.trim().is_empty() {
        return resolved;
    }

    ResolvedMetadata {
        title: supplied_title
            .map(str::to_string)
            .unwrap_or_else(|| filename_stem(original_name)),
        artist: String::new(),
        album: None,
        duration: resolved.duration,
    }
}
