//! Bounded playback cache with FIFO eviction
//!
//! Insertion-ordered mapping from filename to a loaded audio resource,
//! plus the "preloaded" marker set used to deduplicate in-flight loads.
//! Eviction removes the oldest-inserted entry (FIFO by insertion order,
//! not LRU) and clears its marker atomically.
//!
//! Invariants:
//! - The cache never exceeds capacity after a sweep.
//! - Every cached filename also carries a preloaded marker.
//! - A marker may exist without a cache entry: that is an in-flight load.

use crate::source::LoadedTrack;
use std::collections::{HashMap, HashSet, VecDeque};

/// Default number of speculatively cached tracks.
pub const DEFAULT_CAPACITY: usize = 10;

/// Insertion-ordered, capacity-bounded track cache.
#[derive(Debug)]
pub struct PlaybackCache {
    capacity: usize,
    /// Filenames in insertion order; front is oldest.
    order: VecDeque<String>,
    entries: HashMap<String, LoadedTrack>,
    /// Filenames cached or currently being loaded.
    preloaded: HashSet<String>,
}

impl PlaybackCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            entries: HashMap::new(),
            preloaded: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.contains_key(filename)
    }

    pub fn get(&self, filename: &str) -> Option<&LoadedTrack> {
        self.entries.get(filename)
    }

    /// Whether a load for this filename is cached or already in flight.
    pub fn is_preloaded(&self, filename: &str) -> bool {
        self.preloaded.contains(filename)
    }

    /// Set the in-flight marker. Returns false when it was already set,
    /// in which case the caller must not start another load.
    pub fn mark_preloaded(&mut self, filename: &str) -> bool {
        self.preloaded.insert(filename.to_string())
    }

    /// Drop the in-flight marker for a failed load so a later preload may
    /// retry. Cached entries keep their marker.
    pub fn clear_preload_marker(&mut self, filename: &str) {
        if !self.entries.contains_key(filename) {
            self.preloaded.remove(filename);
        }
    }

    /// Insert a loaded track, marking it preloaded. Re-inserting an
    /// existing filename replaces the resource without changing its
    /// position in the eviction order.
    pub fn insert(&mut self, track: LoadedTrack) {
        let filename = track.filename.clone();
        if self.entries.insert(filename.clone(), track).is_none() {
            self.order.push_back(filename.clone());
        }
        self.preloaded.insert(filename);
    }

    /// Periodic sweep step: when over capacity, remove the single
    /// oldest-inserted entry and its preloaded marker.
    ///
    /// Returns the evicted filename, if any.
    pub fn evict_if_over_capacity(&mut self) -> Option<String> {
        if self.entries.len() <= self.capacity {
            return None;
        }
        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        self.preloaded.remove(&oldest);
        Some(oldest)
    }

    /// Drop everything; used on session teardown.
    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
        self.preloaded.clear();
    }
}

impl Default for PlaybackCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
