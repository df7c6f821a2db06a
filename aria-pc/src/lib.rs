//! # Aria Playback Client Library (aria-pc)
//!
//! Headless playback session against an Aria media server: a bounded
//! playback cache with FIFO eviction, speculative adjacent-track
//! preloading, and cache-first metadata with filename fallback.

pub mod cache;
pub mod error;
pub mod session;
pub mod source;

pub use error::{Error, Result};
pub use session::PlaybackSession;
