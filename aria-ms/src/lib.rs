//! # Aria Media Server Library (aria-ms)
//!
//! Metadata extraction and byte-range streaming for a local music library.
//!
//! **Purpose:** Parse embedded tag containers (ID3v2 for MPEG audio,
//! Vorbis-comment-style tags in Ogg/Opus), derive playable duration from
//! container framing when codec metadata is absent, and serve file bytes
//! over HTTP with conditional caching and partial-content support.
//!
//! **Architecture:** Pure tag parsers over bounded byte windows, a
//! cache-first metadata resolver, and an axum HTTP surface on top.

pub mod api;
pub mod library;
pub mod range;
pub mod tags;

pub use aria_common::{Error, Result};
