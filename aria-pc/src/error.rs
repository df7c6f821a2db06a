//! Error types for aria-pc

use thiserror::Error;

/// Convenience Result type using aria-pc Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the playback client
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport errors talking to the media server
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server responded with an unexpected status
    #[error("Server error: {status} for {filename}")]
    Server {
        status: u16,
        filename: String,
    },

    /// Malformed server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Playback session has no tracks to operate on
    #[error("Empty track list")]
    EmptyTrackList,

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}
