//! HTTP request handlers
//!
//! The media handler is a state machine over request conditions, evaluated
//! in precedence order: missing file (404), conditional hit (304), range
//! request (416/206), full audio response (200, immutable), then plain
//! static serving (200, short-lived cache).

use crate::api::AppState;
use crate::range::{self, ByteRange, RangeRequest};
use crate::tags;
use aria_common::{Error, TrackMetadata};
use axum::{
    extract::{Path as UrlPath, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use rand::seq::SliceRandom;
use serde_json::json;
use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, warn};

// ============================================================================
// Track list and metadata
// ============================================================================

/// GET /api/music - shuffled list of library filenames
pub async fn list_music(State(state): State<AppState>) -> impl IntoResponse {
    let mut files = state.library.list_files();
    files.shuffle(&mut rand::thread_rng());
    debug!(count = files.len(), "serving track list");
    ([(header::CACHE_CONTROL, range::CACHE_LIST)], Json(files))
}

/// GET /api/metadata/*filename - resolved track metadata
///
/// 404 only when the file itself is absent. Internal failures degrade to
/// filename-derived metadata with a 200; a parse problem is never
/// surfaced as an error status.
pub async fn get_metadata(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Response {
    match state.library.resolve(&filename).await {
        Ok(metadata) => {
            ([(header::CACHE_CONTROL, range::CACHE_SHORT)], Json(metadata)).into_response()
        }
        Err(Error::NotFound(_)) => (StatusCode::NOT_FOUND, "File not found").into_response(),
        Err(e) => {
            warn!(filename, error = %e, "metadata resolution failed, using filename fallback");
            (
                [(header::CACHE_CONTROL, range::CACHE_SHORT)],
                Json(TrackMetadata::from_filename(filename)),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Dashboard config scalars
// ============================================================================

/// GET /api/name - configured display name
pub async fn get_name(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, range::CACHE_SHORT)],
        Json(json!({ "name": state.config.display_name })),
    )
}

/// GET /api/location - configured latitude/longitude
pub async fn get_location(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, range::CACHE_SHORT)],
        Json(json!({
            "lat": state.config.latitude,
            "long": state.config.longitude,
        })),
    )
}

// ============================================================================
// Media byte serving
// ============================================================================

/// GET /music/*filename - media bytes with caching and range support
pub async fn serve_media(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let path = match state.library.resolve_path(&filename) {
        Ok(path) => path,
        Err(_) => return not_found(),
    };
    let file_meta = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        _ => return not_found(),
    };
    let file_size = file_meta.len();
    let etag = range::etag(file_size, file_meta.modified().unwrap_or(UNIX_EPOCH));

    // A conditional hit always wins, even when a Range header is present.
    if if_none_match_hit(&headers, &etag) {
        return (
            StatusCode::NOT_MODIFIED,
            [
                (header::ETAG, etag),
                (header::CACHE_CONTROL, range::CACHE_IMMUTABLE.to_string()),
            ],
        )
            .into_response();
    }

    let is_audio = tags::is_audio_file(&filename);
    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    if let (true, Some(range_header)) = (is_audio, range_header) {
        match range::parse_range(range_header, file_size) {
            Some(RangeRequest::Unsatisfiable) => {
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{file_size}"))],
                )
                    .into_response();
            }
            Some(RangeRequest::Satisfiable(byte_range)) => {
                let chunk = match read_byte_range(&path, byte_range).await {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!(filename, error = %e, "failed to read byte range");
                        return internal_error();
                    }
                };
                debug!(
                    filename,
                    start = byte_range.start,
                    end = byte_range.end,
                    "serving partial content"
                );
                return (
                    StatusCode::PARTIAL_CONTENT,
                    [
                        (
                            header::CONTENT_RANGE,
                            format!("bytes {}-{}/{}", byte_range.start, byte_range.end, file_size),
                        ),
                        (header::ACCEPT_RANGES, "bytes".to_string()),
                        (header::CONTENT_LENGTH, byte_range.len().to_string()),
                        (header::CONTENT_TYPE, tags::mime_type(&filename).to_string()),
                        (header::ETAG, etag),
                        (header::CACHE_CONTROL, range::CACHE_IMMUTABLE.to_string()),
                    ],
                    chunk,
                )
                    .into_response();
            }
            // Malformed range headers are ignored per RFC 9110; serve the
            // full resource instead.
            None => {}
        }
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(filename, error = %e, "failed to read file");
            return internal_error();
        }
    };

    if is_audio {
        let expires = (chrono::Utc::now() + chrono::Duration::days(365))
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        (
            StatusCode::OK,
            [
                (header::ACCEPT_RANGES, "bytes".to_string()),
                (header::CONTENT_TYPE, tags::mime_type(&filename).to_string()),
                (header::CONTENT_LENGTH, file_size.to_string()),
                (header::ETAG, etag),
                (header::CACHE_CONTROL, range::CACHE_IMMUTABLE.to_string()),
                (header::EXPIRES, expires),
            ],
            bytes,
        )
            .into_response()
    } else {
        // Non-audio files under /music/: conditional caching only
        (
            StatusCode::OK,
            [
                (header::ETAG, etag),
                (header::CACHE_CONTROL, range::CACHE_SHORT.to_string()),
            ],
            bytes,
        )
            .into_response()
    }
}

// ============================================================================
// Static assets
// ============================================================================

/// Fallback handler: conditionally-cached static file serving.
///
/// `GET /` serves `index.html` from the static folder. No range support.
pub async fn serve_static(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let relative = uri.path().trim_start_matches('/');
    let relative = if relative.is_empty() { "index.html" } else { relative };

    let path = match safe_join(&state.config.static_folder, relative) {
        Some(path) => path,
        None => return not_found(),
    };
    let file_meta = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => meta,
        _ => return not_found(),
    };
    let etag = range::etag(file_meta.len(), file_meta.modified().unwrap_or(UNIX_EPOCH));

    if if_none_match_hit(&headers, &etag) {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read static file");
            return internal_error();
        }
    };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, static_mime_type(relative).to_string()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, range::CACHE_SHORT.to_string()),
        ],
        bytes,
    )
        .into_response()
}

// ============================================================================
// Helpers
// ============================================================================

fn if_none_match_hit(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == etag)
        .unwrap_or(false)
}

async fn read_byte_range(path: &Path, byte_range: ByteRange) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(SeekFrom::Start(byte_range.start)).await?;
    let mut buf = vec![0u8; byte_range.len() as usize];
    file.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Join a request path onto a base folder, rejecting traversal.
fn safe_join(base: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => return None,
        }
    }
    Some(base.join(relative))
}

/// MIME types for the handful of static asset kinds the dashboard ships.
fn static_mime_type(filename: &str) -> &'static str {
    match tags::extension_of(filename).as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
}
