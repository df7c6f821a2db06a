//! # Aria Common Library (aria-common)
//!
//! Shared types for the Aria media server and playback client:
//! track metadata, error types, configuration loading, and the
//! filename-derived metadata fallback used on both sides.

pub mod config;
pub mod error;
pub mod filename;
pub mod metadata;

pub use error::{Error, Result};
pub use metadata::TrackMetadata;
