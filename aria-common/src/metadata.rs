//! Track metadata shared between the media server and the playback client
//!
//! A `TrackMetadata` is produced once by the server-side resolver (or, on
//! transport failure, synthesized client-side from the filename) and is
//! immutable after construction.

use serde::{Deserialize, Serialize};

/// Resolved metadata for a single track.
///
/// Optional fields are `None` when neither the embedded tag nor the
/// filename fallback could supply them. `duration` is in seconds and is
/// only populated for containers where the server can derive it
/// (Opus granule position); the client's codec-reported duration takes
/// precedence when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl TrackMetadata {
    /// Metadata with every tag field empty, for files with no usable tags.
    pub fn empty(filename: impl Into<String>) -> Self {
        Self {
            title: None,
            artist: None,
            album: None,
            year: None,
            genre: None,
            filename: filename.into(),
            duration: None,
        }
    }

    /// Metadata derived purely from the filename heuristic.
    ///
    /// Used by the server when a file carries no embedded tag, and by the
    /// client when the metadata endpoint is unreachable.
    pub fn from_filename(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let parsed = crate::filename::parse(&filename);
        Self {
            title: Some(parsed.title),
            artist: Some(parsed.artist),
            album: Some(parsed.album),
            year: None,
            genre: None,
            filename,
            duration: None,
        }
    }
}
