//! Media library: file listing and cache-first metadata resolution
//!
//! `MediaLibrary` owns the music root folder and an unbounded metadata
//! cache keyed by filename. Files are assumed immutable for the process
//! lifetime, so cache hits are returned without any freshness check.
//!
//! Tag parsing reads bounded windows only (the first 64 KiB for ID3v2,
//! the first and last 256 KiB for Opus comments and duration) so metadata
//! latency and memory stay flat regardless of file size.

use crate::tags::{self, EmbeddedTags, TagFormat};
use aria_common::filename::FilenameTags;
use aria_common::{Error, Result, TrackMetadata};
use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// ID3v2 tags live at the very start of the file.
const ID3_WINDOW: u64 = 64 * 1024;

/// The OpusTags header sits near the start of the stream.
const OPUS_HEAD_WINDOW: u64 = 256 * 1024;

/// The final Ogg page (total granule position) sits near the end.
const OPUS_TAIL_WINDOW: u64 = 256 * 1024;

/// Music library rooted at a folder, with a process-lifetime metadata cache.
pub struct MediaLibrary {
    root: PathBuf,
    metadata_cache: RwLock<HashMap<String, TrackMetadata>>,
}

impl MediaLibrary {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            metadata_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List recognized audio files under the root, as root-relative paths.
    pub fn list_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let name = relative.to_string_lossy().replace('\\', "/");
            if tags::is_audio_file(&name) {
                files.push(name);
            }
        }
        files
    }

    /// Resolve metadata for a library-relative filename.
    ///
    /// Cache-first; on a miss, the file's embedded tag is merged over the
    /// filename heuristic (embedded fields win when non-empty) and the
    /// result is cached. A missing file is `Error::NotFound`, distinct
    /// from a file with no usable tags, which still resolves with
    /// heuristic-only fields.
    pub async fn resolve(&self, filename: &str) -> Result<TrackMetadata> {
        if let Some(cached) = self.metadata_cache.read().await.get(filename) {
            return Ok(cached.clone());
        }

        let path = self.resolve_path(filename)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::NotFound(filename.to_string()));
        }

        let (embedded, duration) = match TagFormat::from_filename(filename) {
            TagFormat::Mp3Tags => {
                let head = self.read_window(&path, filename, Window::Head(ID3_WINDOW)).await;
                (tags::id3::parse(&head), None)
            }
            TagFormat::OpusTags => {
                let head = self
                    .read_window(&path, filename, Window::Head(OPUS_HEAD_WINDOW))
                    .await;
                let tail = self
                    .read_window(&path, filename, Window::Tail(OPUS_TAIL_WINDOW))
                    .await;
                (
                    tags::opus::parse_comments(&head).unwrap_or_default(),
                    tags::opus::estimate_duration(&tail),
                )
            }
            TagFormat::Unsupported => (EmbeddedTags::default(), None),
        };

        let metadata = merge(embedded, filename, duration);
        debug!(filename, title = ?metadata.title, "resolved track metadata");
        self.metadata_cache
            .write()
            .await
            .insert(filename.to_string(), metadata.clone());
        Ok(metadata)
    }

    /// Map a library-relative filename onto the filesystem, rejecting
    /// parent-directory traversal.
    pub fn resolve_path(&self, filename: &str) -> Result<PathBuf> {
        let relative = Path::new(filename);
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "invalid path component in {filename:?}"
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }

    /// Read a bounded byte window from a file. Read failures degrade to an
    /// empty buffer; the caller still resolves from the filename alone.
    async fn read_window(&self, path: &Path, filename: &str, window: Window) -> Vec<u8> {
        match read_window_inner(path, window).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(filename, error = %e, "failed to read tag window");
                Vec::new()
            }
        }
    }
}

/// Which end of the file to read, and how much.
#[derive(Debug, Clone, Copy)]
enum Window {
    Head(u64),
    Tail(u64),
}

async fn read_window_inner(path: &Path, window: Window) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    let limit = match window {
        Window::Head(limit) => limit,
        Window::Tail(limit) => {
            let len = file.metadata().await?.len();
            file.seek(SeekFrom::Start(len.saturating_sub(limit))).await?;
            limit
        }
    };
    let mut buf = Vec::with_capacity(limit.min(1 << 20) as usize);
    file.take(limit).read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Merge embedded tag fields over the filename heuristic: an embedded
/// field wins when non-empty, the heuristic fills the gaps. Year and genre
/// come only from the embedded tag, matching the display contract.
fn merge(embedded: EmbeddedTags, filename: &str, duration: Option<f64>) -> TrackMetadata {
    let fallback: FilenameTags = aria_common::filename::parse(filename);
    let non_empty = |field: Option<String>| field.filter(|s| !s.trim().is_empty());
    TrackMetadata {
        title: non_empty(embedded.title).or(Some(fallback.title)),
        artist: non_empty(embedded.artist).or(Some(fallback.artist)),
        album: non_empty(embedded.album).or(Some(fallback.album)),
        year: non_empty(embedded.year),
        genre: non_empty(embedded.genre),
        filename: filename.to_string(),
        duration,
    }
}
