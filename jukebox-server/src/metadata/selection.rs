//! Release selection heuristic
//!
//! A recording search returns many (recording, release) pairs: the studio
//! album, reissues, compilations, live albums, singles. This picks the one
//! most likely to be "the album" a song belongs to.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::musicbrainz::{MBRecording, MBRelease};

/// Release-group secondary types that disqualify a release
const EXCLUDED_SECONDARY_TYPES: [&str; 4] = ["Live", "Compilation", "Remix", "Bonus"];

/// Words marking reissues and compilations in a release-group title
/// (matched case-insensitively)
const AVOID_TITLE_WORDS: [&str; 7] = [
    "anniversary",
    "edition",
    "collection",
    "hits",
    "bonus",
    "remix",
    "live",
];

/// Outcome of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecording {
    pub title: String,
    /// Credited artist names joined with ", "
    pub artist: String,
    /// Release-group title
    pub album: Option<String>,
    /// Title of the chosen release (edition)
    pub release: String,
    pub date: Option<String>,
    pub length_ms: Option<u64>,
}

/// One (recording, release) pair
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    recording: &'a MBRecording,
    release: &'a MBRelease,
    date: Option<&'a str>,
}

impl<'a> Candidate<'a> {
    fn new(recording: &'a MBRecording, release: &'a MBRelease) -> Self {
        let date = release
            .date
            .as_deref()
            .or_else(|| release.release_events.first().and_then(|e| e.date.as_deref()))
            .filter(|d| !d.is_empty());

        Self {
            recording,
            release,
            date,
        }
    }

    fn group_title(&self) -> Option<&'a str> {
        self.release
            .release_group
            .as_ref()
            .and_then(|rg| rg.title.as_deref())
    }

    fn is_album(&self) -> bool {
        self.release
            .release_group
            .as_ref()
            .and_then(|rg| rg.primary_type.as_deref())
            == Some("Album")
    }

    fn is_official_album(&self) -> bool {
        self.release.status.as_deref() == Some("Official") && self.is_album()
    }

    fn has_excluded_secondary_type(&self) -> bool {
        self.release.release_group.as_ref().is_some_and(|rg| {
            rg.secondary_types
                .iter()
                .any(|t| EXCLUDED_SECONDARY_TYPES.contains(&t.as_str()))
        })
    }

    fn has_clean_group_title(&self) -> bool {
        match self.group_title() {
            Some(title) => {
                let lower = title.to_lowercase();
                !AVOID_TITLE_WORDS.iter().any(|w| lower.contains(w))
            }
            None => false,
        }
    }

    fn into_resolved(self) -> ResolvedRecording {
        let artist = self
            .recording
            .artist_credit
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        ResolvedRecording {
            title: self.recording.title.clone(),
            artist,
            album: self.group_title().map(str::to_string),
            release: self.release.title.clone(),
            date: self.date.map(str::to_string),
            length_ms: self.recording.length,
        }
    }
}

/// Dates compare as strings; a missing date sorts after any present one
fn compare_dates(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// First candidate with the earliest date
fn earliest<'a, I>(candidates: I) -> Option<Candidate<'a>>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    candidates
        .into_iter()
        .min_by(|a, b| compare_dates(a.date, b.date))
}

/// Pick the best release across all recordings
///
/// 1. Keep official albums without live/compilation/remix/bonus secondary types.
/// 2. Among those, prefer clean release-group titles, most frequent title
///    first, then earliest date, then input order.
/// 3. Otherwise the earliest kept release; if none were kept, the earliest
///    official album, then the first album of any status, then the first pair.
///
/// Returns `None` only when no recording has any release.
pub fn select_release(recordings: &[MBRecording]) -> Option<ResolvedRecording> {
    let candidates: Vec<Candidate<'_>> = recordings
        .iter()
        .flat_map(|rec| rec.releases.iter().map(move |rel| Candidate::new(rec, rel)))
        .collect();

    let first = *candidates.first()?;

    let filtered: Vec<Candidate<'_>> = candidates
        .iter()
        .copied()
        .filter(|c| c.is_official_album() && !c.has_excluded_secondary_type())
        .collect();

    let best = if !filtered.is_empty() {
        let mut title_counts: HashMap<&str, usize> = HashMap::new();
        for title in filtered.iter().filter_map(|c| c.group_title()) {
            *title_counts.entry(title).or_default() += 1;
        }

        let mut preferred: Vec<Candidate<'_>> = filtered
            .iter()
            .copied()
            .filter(|c| c.has_clean_group_title())
            .collect();

        // Stable sort keeps input order for full ties
        preferred.sort_by(|a, b| {
            let count_a = a.group_title().and_then(|t| title_counts.get(t)).unwrap_or(&0);
            let count_b = b.group_title().and_then(|t| title_counts.get(t)).unwrap_or(&0);
            count_b
                .cmp(count_a)
                .then_with(|| compare_dates(a.date, b.date))
        });

        preferred
            .first()
            .copied()
            .or_else(|| earliest(filtered.iter().copied()))
    } else {
        earliest(candidates.iter().copied().filter(|c| c.is_official_album()))
            .or_else(|| candidates.iter().copied().find(|c| c.is_album()))
    };

    Some(best.unwrap_or(first).into_resolved())
}
