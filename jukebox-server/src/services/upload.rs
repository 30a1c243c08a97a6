//! Multipart song upload
//!
//! Accepts at most two files: one audio file (stored under
//! `uploads/songs/`) and one optional image (under `uploads/thumbnails/`),
//! routed by MIME type. Text fields `title`, `artist`, `album` and `explicit`
//! seed the metadata resolver. Files already written are removed again if
//! the upload fails.

use axum::extract::multipart::{Field, Multipart};
use jukebox_common::models::Song;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::storage::{Storage, UploadKind};
use crate::db::songs::NewSong;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Accepted audio MIME types
pub const AUDIO_MIME_TYPES: [&str; 9] = [
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/flac",
    "audio/x-flac",
    "audio/aac",
    "audio/ogg",
    "audio/x-ms-wma",
];

pub const MAX_UPLOAD_FILES: usize = 2;

/// Route a MIME type to its upload directory; `None` for unsupported types
pub fn classify(content_type: &str) -> Option<UploadKind> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if AUDIO_MIME_TYPES.contains(&mime.as_str()) {
        Some(UploadKind::Song)
    } else if mime.starts_with("image/") {
        Some(UploadKind::Thumbnail)
    } else {
        None
    }
}

/// A file written to disk during this upload
#[derive(Debug)]
struct StoredUpload {
    relative: String,
    absolute: PathBuf,
    original_name: String,
}

#[derive(Debug, Default)]
struct UploadForm {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    explicit: bool,
    audio: Option<StoredUpload>,
    thumbnail: Option<StoredUpload>,
    file_count: usize,
}

impl UploadForm {
    async fn discard(self, storage: &Storage) {
        if let Some(audio) = self.audio {
            storage.remove(UploadKind::Song, &audio.relative).await;
        }
        if let Some(thumbnail) = self.thumbnail {
            storage.remove(UploadKind::Thumbnail, &thumbnail.relative).await;
        }
    }
}

async fn store_field(
    storage: &Storage,
    kind: UploadKind,
    original_name: String,
    mut field: Field<'_>,
) -> ApiResult<StoredUpload> {
    let (relative, absolute, mut file) = storage.create(kind, &original_name).await?;

    let written: ApiResult<()> = async {
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(e) = written {
        storage.remove(kind, &relative).await;
        return Err(e);
    }

    Ok(StoredUpload {
        relative,
        absolute,
        original_name,
    })
}

async fn read_form(
    storage: &Storage,
    multipart: &mut Multipart,
    form: &mut UploadForm,
) -> ApiResult<()> {
    while let Some(field) = multipart.next_field().await? {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            let name = field.name().unwrap_or_default().to_string();
            let value = field.text().await?;
            match name.as_str() {
                "title" => form.title = Some(value),
                "artist" => form.artist = Some(value),
                "album" => form.album = Some(value).filter(|a| !a.trim().is_empty()),
                "explicit" => form.explicit = matches!(value.trim(), "true" | "1"),
                _ => {}
            }
            continue;
        };

        form.file_count += 1;
        if form.file_count > MAX_UPLOAD_FILES {
            return Err(ApiError::BadRequest(format!(
                "At most {} files per upload",
                MAX_UPLOAD_FILES
            )));
        }

        let kind = field
            .content_type()
            .and_then(classify)
            .ok_or_else(|| ApiError::BadRequest("Invalid file type".to_string()))?;

        let slot_taken = match kind {
            UploadKind::Song => form.audio.is_some(),
            UploadKind::Thumbnail => form.thumbnail.is_some(),
        };
        if slot_taken {
            return Err(ApiError::BadRequest(
                "Only one audio file and one image are allowed".to_string(),
            ));
        }

        let stored = store_field(storage, kind, original_name, field).await?;
        match kind {
            UploadKind::Song => form.audio = Some(stored),
            UploadKind::Thumbnail => form.thumbnail = Some(stored),
        }
    }

    Ok(())
}

/// Store the uploaded files, resolve metadata and create the song row
pub async fn upload(state: &AppState, owner_id: &str, mut multipart: Multipart) -> ApiResult<Song> {
    let mut form = UploadForm::default();

    if let Err(e) = read_form(&state.storage, &mut multipart, &mut form).await {
        form.discard(&state.storage).await;
        return Err(e);
    }

    let Some(audio) = form.audio.as_ref() else {
        form.discard(&state.storage).await;
        return Err(ApiError::BadRequest("Song file is required".to_string()));
    };

    let resolved = state
        .resolver
        .resolve(
            form.title.as_deref(),
            form.artist.as_deref(),
            &audio.absolute,
            &audio.original_name,
        )
        .await;

    let new_song = NewSong {
        title: resolved.title,
        artist: resolved.artist,
        album: resolved.album.or_else(|| form.album.clone()),
        file_path: Some(audio.relative.clone()),
        cover_path: form.thumbnail.as_ref().map(|t| t.relative.clone()),
        duration: resolved.duration,
        explicit: form.explicit,
    };

    match super::songs::insert(state, owner_id, new_song).await {
        Ok(song) => {
            info!(song_id = %song.id, title = %song.title, "Stored uploaded song");
            Ok(song)
        }
        Err(e) => {
            form.discard(&state.storage).await;
            Err(e)
        }
    }
}
