//! Upload metadata resolution
//!
//! A MusicBrainz recording search with a release-selection heuristic,
//! falling back to tags embedded in the uploaded file.

pub mod musicbrainz;
pub mod resolver;
pub mod selection;
pub mod tags;

pub use musicbrainz::{MBError, MusicBrainzClient};
pub use resolver::{MetadataResolver, ResolvedMetadata};
pub use selection::{select_release, ResolvedRecording};
