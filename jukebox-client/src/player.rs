//! Playback queue
//!
//! Pure state: which track is current and what plays next. Audio output is
//! left to the embedding application.

use jukebox_common::models::Song;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub stream_url: String,
}

impl Track {
    /// Track for a song served by `base_url`
    pub fn from_song(song: &Song, base_url: &str) -> Self {
        Self {
            id: song.id.clone(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            stream_url: format!("{}/songs/{}/stream", base_url.trim_end_matches('/'), song.id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    Off,
    One,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerQueue {
    tracks: Vec<Track>,
    current: Option<usize>,
    repeat: Repeat,
    shuffle: bool,
}

impl PlayerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue and start at `start` (clamped to the queue)
    pub fn set_queue(&mut self, tracks: Vec<Track>, start: usize) {
        self.current = (!tracks.is_empty()).then(|| start.min(tracks.len() - 1));
        self.tracks = tracks;
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Jump to a track by index; out of range is ignored
    pub fn play_index(&mut self, index: usize) -> Option<&Track> {
        if index < self.tracks.len() {
            self.current = Some(index);
        }
        self.current()
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: Repeat) {
        self.repeat = repeat;
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Advance to the next track
    ///
    /// Shuffle picks a random other track. Otherwise the last track wraps to
    /// the first only with [`Repeat::All`] and stays put without it.
    pub fn next(&mut self) -> Option<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        let next = match self.current {
            None => 0,
            Some(i) if self.shuffle && len > 1 => {
                // Offset in 1..len never lands on the current track
                (i + rand::thread_rng().gen_range(1..len)) % len
            }
            Some(i) if i + 1 < len => i + 1,
            Some(_) if self.repeat == Repeat::All => 0,
            Some(i) => i,
        };

        self.current = Some(next);
        self.current()
    }

    /// Step back; the first track wraps to the last only with [`Repeat::All`]
    pub fn previous(&mut self) -> Option<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        let previous = match self.current {
            None => 0,
            Some(i) if i > 0 => i - 1,
            Some(_) if self.repeat == Repeat::All => len - 1,
            Some(_) => 0,
        };

        self.current = Some(previous);
        self.current()
    }

    /// The current track finished playing
    pub fn on_track_end(&mut self) -> Option<&Track> {
        if self.repeat == Repeat::One {
            return self.current();
        }
        self.next()
    }

    /// Off → One → All → Off
    pub fn cycle_repeat(&mut self) -> Repeat {
        self.repeat = match self.repeat {
            Repeat::Off => Repeat::One,
            Repeat::One => Repeat::All,
            Repeat::All => Repeat::Off,
        };
        self.repeat
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Title {}", id),
            artist: "Artist".to_string(),
            stream_url: format!("http://localhost/songs/{}/stream", id),
        }
    }

    fn queue(ids: &[&str]) -> PlayerQueue {
        let mut q = PlayerQueue::new();
        q.set_queue(ids.iter().map(|id| track(id)).collect(), 0);
        q
    }

    fn current_id(q: &PlayerQueue) -> &str {
        q.current().map(|t| t.id.as_str()).unwrap_or("")
    }

    #[test]
    fn test_next_stops_at_end_without_repeat_all() {
        let mut q = queue(&["a", "b"]);
        q.next();
        assert_eq!(current_id(&q), "b");
        q.next();
        assert_eq!(current_id(&q), "b");

        q.set_repeat(Repeat::One);
        q.next();
        assert_eq!(current_id(&q), "b");
    }

    #[test]
    fn test_next_wraps_with_repeat_all() {
        let mut q = queue(&["a", "b"]);
        q.set_repeat(Repeat::All);
        q.next();
        q.next();
        assert_eq!(current_id(&q), "a");
    }

    #[test]
    fn test_previous_mirrors_next() {
        let mut q = queue(&["a", "b", "c"]);
        q.previous();
        assert_eq!(current_id(&q), "a");

        q.set_repeat(Repeat::All);
        q.previous();
        assert_eq!(current_id(&q), "c");
        q.previous();
        assert_eq!(current_id(&q), "b");
    }

    #[test]
    fn test_track_end_replays_with_repeat_one() {
        let mut q = queue(&["a", "b"]);
        q.set_repeat(Repeat::One);
        assert_eq!(q.on_track_end().unwrap().id, "a");

        q.set_repeat(Repeat::Off);
        assert_eq!(q.on_track_end().unwrap().id, "b");
    }

    #[test]
    fn test_shuffle_never_repeats_current() {
        let mut q = queue(&["a", "b", "c", "d"]);
        assert!(q.toggle_shuffle());

        for _ in 0..50 {
            let before = q.current_index();
            q.next();
            assert_ne!(q.current_index(), before);
        }

        let mut single = queue(&["only"]);
        single.toggle_shuffle();
        assert_eq!(single.next().unwrap().id, "only");
    }

    #[test]
    fn test_cycle_repeat() {
        let mut q = PlayerQueue::new();
        assert_eq!(q.cycle_repeat(), Repeat::One);
        assert_eq!(q.cycle_repeat(), Repeat::All);
        assert_eq!(q.cycle_repeat(), Repeat::Off);
    }

    #[test]
    fn test_empty_queue() {
        let mut q = PlayerQueue::new();
        assert!(q.next().is_none());
        assert!(q.previous().is_none());
        assert!(q.on_track_end().is_none());

        q.set_queue(vec![track("a"), track("b")], 9);
        assert_eq!(current_id(&q), "b");
    }
}
