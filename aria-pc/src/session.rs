//! Playback session state machine
//!
//! Owns the track list, the current index, the metadata cache, and the
//! speculative playback cache. A track change is an explicit ordered
//! sequence: resolve metadata (awaited), load the track (awaited,
//! cache-first), then fire-and-forget preloads of both circular
//! neighbors. Preloading is best-effort: failures are logged and
//! swallowed, and an in-flight preload is never cancelled by navigation.
//!
//! The cache sits behind an async Mutex because preloads run on spawned
//! tasks; the session itself is a single logical timeline.

use crate::cache::{PlaybackCache, DEFAULT_CAPACITY};
use crate::source::{LoadedTrack, TrackSource};
use crate::{Error, Result};
use aria_common::TrackMetadata;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Interval between eviction sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Playback session over a fixed (circular) track list.
pub struct PlaybackSession<S: TrackSource> {
    source: Arc<S>,
    tracks: Vec<String>,
    current_index: usize,
    metadata_cache: HashMap<String, TrackMetadata>,
    cache: Arc<Mutex<PlaybackCache>>,
    /// The currently playing resource. Held outside the speculative
    /// cache, so eviction can never interrupt current playback.
    active: Option<LoadedTrack>,
}

impl<S: TrackSource + 'static> PlaybackSession<S> {
    pub fn new(source: S, tracks: Vec<String>) -> Self {
        Self::with_capacity(source, tracks, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(source: S, tracks: Vec<String>, capacity: usize) -> Self {
        Self {
            source: Arc::new(source),
            tracks,
            current_index: 0,
            metadata_cache: HashMap::new(),
            cache: Arc::new(Mutex::new(PlaybackCache::new(capacity))),
            active: None,
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_filename(&self) -> Option<&str> {
        self.tracks.get(self.current_index).map(String::as_str)
    }

    /// The currently playing resource, if a track has been loaded.
    pub fn active_track(&self) -> Option<&LoadedTrack> {
        self.active.as_ref()
    }

    /// Shared handle to the speculative cache (for the sweep task and
    /// tests).
    pub fn cache_handle(&self) -> Arc<Mutex<PlaybackCache>> {
        Arc::clone(&self.cache)
    }

    /// Make track `index` current: resolve its metadata, load its bytes
    /// (cache-first), then kick off neighbor preloads in the background.
    ///
    /// Returns the metadata for display. Every navigation path (user
    /// input, previous/next, auto-advance) funnels through here, so
    /// adjacency preloading is re-triggered on every track change.
    pub async fn track_changed(&mut self, index: usize) -> Result<TrackMetadata> {
        if self.tracks.is_empty() {
            return Err(Error::EmptyTrackList);
        }
        self.current_index = index % self.tracks.len();
        let filename = self.tracks[self.current_index].clone();

        let metadata = self.metadata(&filename).await;
        let track = self.load_current(&filename).await?;
        info!(
            filename,
            title = metadata.title.as_deref().unwrap_or("?"),
            duration = ?Self::effective_duration(&track, &metadata),
            "track changed"
        );
        self.active = Some(track);

        self.preload_adjacent();
        Ok(metadata)
    }

    /// Advance to the next track (wraps around).
    pub async fn next(&mut self) -> Result<TrackMetadata> {
        let n = self.track_count().max(1);
        self.track_changed((self.current_index + 1) % n).await
    }

    /// Go back to the previous track (wraps around).
    pub async fn previous(&mut self) -> Result<TrackMetadata> {
        let n = self.track_count().max(1);
        self.track_changed((self.current_index + n - 1) % n).await
    }

    /// Auto-advance when the current track ends. Same transition as
    /// `next`; kept separate so callers read as the event they handle.
    pub async fn advance_on_end(&mut self) -> Result<TrackMetadata> {
        self.next().await
    }

    /// Cache-first metadata lookup. Transport failures degrade to the
    /// filename heuristic, never to a user-visible error.
    pub async fn metadata(&mut self, filename: &str) -> TrackMetadata {
        if let Some(cached) = self.metadata_cache.get(filename) {
            return cached.clone();
        }
        let metadata = match self.source.fetch_metadata(filename).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(filename, error = %e, "metadata fetch failed, deriving from filename");
                TrackMetadata::from_filename(filename)
            }
        };
        self.metadata_cache
            .insert(filename.to_string(), metadata.clone());
        metadata
    }

    /// The duration to display: the codec-reported value wins when finite,
    /// the server-derived value is the fallback.
    pub fn effective_duration(track: &LoadedTrack, metadata: &TrackMetadata) -> Option<f64> {
        track
            .codec_duration
            .filter(|d| d.is_finite())
            .or(metadata.duration)
    }

    /// Load the current track, preferring the speculative cache. A direct
    /// load marks the filename preloaded but does not insert it into the
    /// cache; the active resource is tracked separately.
    async fn load_current(&self, filename: &str) -> Result<LoadedTrack> {
        if let Some(cached) = self.cache.lock().await.get(filename) {
            debug!(filename, "using cached track");
            return Ok(cached.clone());
        }
        let track = self.source.load(filename).await?;
        self.cache.lock().await.mark_preloaded(filename);
        Ok(track)
    }

    /// Speculatively preload both circular neighbors of the current track.
    /// Fire-and-forget: never blocks or delays the transport.
    pub fn preload_adjacent(&self) {
        let n = self.tracks.len();
        if n < 2 {
            return;
        }
        let neighbors = [
            (self.current_index + n - 1) % n,
            (self.current_index + 1) % n,
        ];
        for index in neighbors {
            if index == self.current_index {
                continue; // two-track lists have one distinct neighbor
            }
            self.spawn_preload(self.tracks[index].clone());
        }
    }

    /// Spawn a background preload of one filename.
    pub fn spawn_preload(&self, filename: String) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            preload(source.as_ref(), &cache, &filename).await;
        })
    }

    /// Preload one filename into the shared cache. Public for callers
    /// that want to await the load (and for tests).
    pub async fn preload(&self, filename: &str) {
        preload(self.source.as_ref(), &self.cache, filename).await;
    }

    /// Start the periodic eviction sweep. Runs until aborted; safe to run
    /// alongside in-flight preloads.
    pub fn spawn_eviction_sweep(&self) -> JoinHandle<()> {
        Self::spawn_eviction_sweep_with(Arc::clone(&self.cache), SWEEP_INTERVAL)
    }

    fn spawn_eviction_sweep_with(
        cache: Arc<Mutex<PlaybackCache>>,
        period: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Some(evicted) = cache.lock().await.evict_if_over_capacity() {
                    debug!(filename = %evicted, "evicted oldest cached track");
                }
            }
        })
    }

    /// Tear down the session: drop cached resources. The sweep task (if
    /// any) is the caller's to abort.
    pub async fn teardown(&mut self) {
        self.active = None;
        self.metadata_cache.clear();
        self.cache.lock().await.clear();
    }
}

/// Guarded preload: marks the filename at dispatch time, under the cache
/// lock, so rapid repeated navigation cannot launch the same load twice.
/// Failures are swallowed (logged only) and release the marker so a later
/// preload may retry.
async fn preload<S: TrackSource + ?Sized>(
    source: &S,
    cache: &Mutex<PlaybackCache>,
    filename: &str,
) {
    {
        let mut cache = cache.lock().await;
        if cache.contains(filename) || !cache.mark_preloaded(filename) {
            return; // already cached or already in flight
        }
    }
    match source.load(filename).await {
        Ok(track) => {
            debug!(filename, "preloaded track");
            cache.lock().await.insert(track);
        }
        Err(e) => {
            warn!(filename, error = %e, "preload failed");
            cache.lock().await.clear_preload_marker(filename);
        }
    }
}
