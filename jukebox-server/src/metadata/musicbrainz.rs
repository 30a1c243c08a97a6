//! MusicBrainz API client
//!
//! Recording search with rate limiting. MusicBrainz asks clients to stay at
//! or below one request per second and to send a descriptive User-Agent.

use jukebox_common::config::MusicBrainzConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// MusicBrainz client errors
#[derive(Debug, Error)]
pub enum MBError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("No recordings found")]
    NoRecordings,

    #[error("No releases found for any recording")]
    NoReleases,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Body of `GET /recording/?query=...`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MBRecordingSearch {
    #[serde(default)]
    pub recordings: Vec<MBRecording>,
}

/// MusicBrainz recording
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MBRecording {
    /// Recording MBID
    pub id: String,
    pub title: String,
    /// Length in milliseconds
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<MBArtistCredit>,
    #[serde(default)]
    pub releases: Vec<MBRelease>,
}

/// MusicBrainz artist credit
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MBArtistCredit {
    /// Credited name (may differ from the artist's own name)
    pub name: String,
}

/// A specific edition of an album
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MBRelease {
    pub id: String,
    pub title: String,
    /// e.g. "Official", "Promotion", "Bootleg"
    #[serde(default)]
    pub status: Option<String>,
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "release-events", default)]
    pub release_events: Vec<MBReleaseEvent>,
    #[serde(rename = "release-group", default)]
    pub release_group: Option<MBReleaseGroup>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MBReleaseEvent {
    #[serde(default)]
    pub date: Option<String>,
}

/// The conceptual album a release belongs to
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MBReleaseGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// e.g. "Album", "Single", "EP"
    #[serde(rename = "primary-type", default)]
    pub primary_type: Option<String>,
    /// e.g. "Live", "Compilation", "Remix"
    #[serde(rename = "secondary-types", default)]
    pub secondary_types: Vec<String>,
}

/// Rate limiter enforcing a minimum spacing between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Lucene query for a recording title plus artist
pub fn recording_query(title: &str, artist: &str) -> String {
    fn quote(value: &str) -> String {
        value.replace('\\', "\\\\").replace('"', "\\\"")
    }
    format!(
        "recording:\"{}\" AND artist:\"{}\"",
        quote(title),
        quote(artist)
    )
}

/// MusicBrainz API client
#[derive(Clone)]
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl MusicBrainzClient {
    pub fn new(config: &MusicBrainzConfig) -> Result<Self, MBError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(config.min_interval_ms)),
        })
    }

    /// Search recordings by title and artist
    ///
    /// Returns every matching recording with its releases and release groups.
    /// An empty result is reported as [`MBError::NoRecordings`].
    pub async fn search_recordings(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Vec<MBRecording>, MBError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/recording/", self.base_url);
        let query = recording_query(title, artist);

        tracing::debug!(url = %url, query = %query, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query.as_str()),
                ("fmt", "json"),
                ("inc", "releases+release-groups+artists"),
            ])
            .send()
            .await
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 503 {
            return Err(MBError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MBError::ApiError(status.as_u16(), error_text));
        }

        let search: MBRecordingSearch = response
            .json()
            .await
            .map_err(|e| MBError::ParseError(e.to_string()))?;

        if search.recordings.is_empty() {
            return Err(MBError::NoRecordings);
        }

        tracing::info!(
            title = %title,
            artist = %artist,
            count = search.recordings.len(),
            "Retrieved recordings from MusicBrainz"
        );

        Ok(search.recordings)
    }
}
