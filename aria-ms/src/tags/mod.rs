//! Embedded tag parsing
//!
//! Pure functions over byte buffers; no I/O happens in this module. The
//! resolver in [`crate::library`] reads a bounded window of the file and
//! hands the bytes here.

pub mod id3;
pub mod opus;

/// Tag container selected once per file by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFormat {
    /// ID3v2 text frames (MPEG audio and friends)
    Mp3Tags,
    /// Vorbis-comment-style `OpusTags` block inside an Ogg container
    OpusTags,
    /// Not a recognized audio file
    Unsupported,
}

impl TagFormat {
    /// Pick the tag container for a filename by extension.
    pub fn from_filename(filename: &str) -> Self {
        match extension_of(filename) {
            Some(ext) if ext == "opus" => TagFormat::OpusTags,
            Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => TagFormat::Mp3Tags,
            _ => TagFormat::Unsupported,
        }
    }
}

/// Tag fields extracted from an embedded container. Every field is `None`
/// when absent or when parsing failed before reaching it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
}

/// Extensions treated as audio for tag parsing, range serving, and
/// library listing.
pub const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "ogg", "opus", "m4a", "flac", "aac"];

/// Lowercased extension of a filename, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether the filename has a recognized audio extension.
pub fn is_audio_file(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// MIME type for a media filename.
pub fn mime_type(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("aac") => "audio/aac",
        _ => "application/octet-stream",
    }
}
