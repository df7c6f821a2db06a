//! Integration tests for the Aria media server API
//!
//! Exercises the complete HTTP surface against a temporary on-disk
//! library: track listing, metadata resolution, conditional requests,
//! and the range-serving state machine.

use aria_ms::api::{create_router, AppState};
use aria_ms::library::MediaLibrary;
use aria_common::config::ServerConfig;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

/// A library with one tagged mp3, one untagged mp3, and one opus file.
fn setup_test_app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let music = dir.path().join("music");
    let public = dir.path().join("public");
    std::fs::create_dir_all(&music).unwrap();
    std::fs::create_dir_all(&public).unwrap();

    write_file(&music.join("Cool Band - Tagged.mp3"), &mp3_fixture());
    write_file(&music.join("Other Band - Untagged.mp3"), &vec![0u8; 1000]);
    write_file(&music.join("ambient.opus"), &opus_fixture());
    write_file(&public.join("index.html"), b"<html>aria</html>");

    let config = ServerConfig {
        root_folder: music.clone(),
        static_folder: public,
        ..ServerConfig::default()
    };
    let state = AppState {
        library: Arc::new(MediaLibrary::new(music)),
        config: Arc::new(config),
    };
    (dir, create_router(state))
}

fn write_file(path: &std::path::Path, contents: &[u8]) {
    std::fs::File::create(path)
        .unwrap()
        .write_all(contents)
        .unwrap();
}

/// ID3v2.3 tag with title and artist frames, followed by junk "audio".
fn mp3_fixture() -> Vec<u8> {
    let mut body = Vec::new();
    for (id, text) in [(b"TIT2", "Window Seat"), (b"TPE1", "Cool Band")] {
        body.extend_from_slice(id);
        body.extend_from_slice(&((text.len() + 1) as u32).to_be_bytes());
        body.extend_from_slice(&[0, 0, 3]);
        body.extend_from_slice(text.as_bytes());
    }
    body.extend_from_slice(&[0u8; 16]);
    let size = body.len() as u32;
    let mut buf = b"ID3\x03\x00\x00".to_vec();
    buf.extend_from_slice(&[
        ((size >> 21) & 0x7f) as u8,
        ((size >> 14) & 0x7f) as u8,
        ((size >> 7) & 0x7f) as u8,
        (size & 0x7f) as u8,
    ]);
    buf.extend_from_slice(&body);
    buf.resize(2000, 0xFF); // pad out to a deterministic size
    buf
}

/// Opus stream with an OpusTags block and a final page at 60 seconds.
fn opus_fixture() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"OggS\x00\x02");
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&[0u8; 12]);
    buf.extend_from_slice(b"OpusTags");
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    let comment = b"TITLE=Drift";
    buf.extend_from_slice(&(comment.len() as u32).to_le_bytes());
    buf.extend_from_slice(comment);
    buf.extend_from_slice(b"OggS\x00\x04");
    buf.extend_from_slice(&2_880_000u64.to_le_bytes());
    buf.extend_from_slice(&[0u8; 12]);
    buf
}

async fn get(app: &axum::Router, path: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    get_with_headers(app, path, &[]).await
}

async fn get_with_headers(
    app: &axum::Router,
    path: &str,
    headers: &[(header::HeaderName, &str)],
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut request = Request::builder().method("GET").uri(path);
    for (name, value) in headers {
        request = request.header(name, *value);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let response_headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, response_headers, body.to_vec())
}

fn header_str<'a>(headers: &'a axum::http::HeaderMap, name: header::HeaderName) -> &'a str {
    headers.get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let (_dir, app) = setup_test_app();
    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "aria-ms");
}

#[tokio::test]
async fn music_list_contains_audio_files_only() {
    let (_dir, app) = setup_test_app();
    let (status, headers, body) = get(&app, "/api/music").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header_str(&headers, header::CACHE_CONTROL), "public, max-age=300");

    let mut files: Vec<String> = serde_json::from_slice(&body).unwrap();
    files.sort();
    assert_eq!(
        files,
        vec![
            "Cool Band - Tagged.mp3",
            "Other Band - Untagged.mp3",
            "ambient.opus"
        ]
    );
}

#[tokio::test]
async fn metadata_prefers_embedded_tags() {
    let (_dir, app) = setup_test_app();
    let (status, _, body) = get(&app, "/api/metadata/Cool%20Band%20-%20Tagged.mp3").await;
    assert_eq!(status, StatusCode::OK);
    let meta: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(meta["title"], "Window Seat");
    assert_eq!(meta["artist"], "Cool Band");
    assert_eq!(meta["filename"], "Cool Band - Tagged.mp3");
}

#[tokio::test]
async fn metadata_falls_back_to_filename() {
    let (_dir, app) = setup_test_app();
    let (status, _, body) = get(&app, "/api/metadata/Other%20Band%20-%20Untagged.mp3").await;
    assert_eq!(status, StatusCode::OK);
    let meta: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(meta["title"], "Untagged");
    assert_eq!(meta["artist"], "Other Band");
    assert_eq!(meta["album"], "Unknown Album");
}

#[tokio::test]
async fn metadata_includes_opus_duration() {
    let (_dir, app) = setup_test_app();
    let (status, _, body) = get(&app, "/api/metadata/ambient.opus").await;
    assert_eq!(status, StatusCode::OK);
    let meta: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(meta["title"], "Drift");
    assert_eq!(meta["duration"], 60.0);
}

#[tokio::test]
async fn metadata_for_missing_file_is_404() {
    let (_dir, app) = setup_test_app();
    let (status, _, _) = get(&app, "/api/metadata/ghost.mp3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_audio_response() {
    let (_dir, app) = setup_test_app();
    let (status, headers, body) = get(&app, "/music/Other%20Band%20-%20Untagged.mp3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 1000);
    assert_eq!(header_str(&headers, header::CONTENT_TYPE), "audio/mpeg");
    assert_eq!(header_str(&headers, header::ACCEPT_RANGES), "bytes");
    assert_eq!(header_str(&headers, header::CONTENT_LENGTH), "1000");
    assert_eq!(
        header_str(&headers, header::CACHE_CONTROL),
        "public, max-age=31536000, immutable"
    );
    assert!(headers.contains_key(header::ETAG));
    assert!(headers.contains_key(header::EXPIRES));
}

#[tokio::test]
async fn explicit_range_request() {
    let (_dir, app) = setup_test_app();
    let (status, headers, body) = get_with_headers(
        &app,
        "/music/Other%20Band%20-%20Untagged.mp3",
        &[(header::RANGE, "bytes=100-199")],
    )
    .await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body.len(), 100);
    assert_eq!(
        header_str(&headers, header::CONTENT_RANGE),
        "bytes 100-199/1000"
    );
    assert_eq!(header_str(&headers, header::CONTENT_LENGTH), "100");
    assert_eq!(header_str(&headers, header::ACCEPT_RANGES), "bytes");
}

#[tokio::test]
async fn open_ended_and_suffix_ranges() {
    let (_dir, app) = setup_test_app();
    for range_header in ["bytes=900-", "bytes=-100"] {
        let (status, headers, body) = get_with_headers(
            &app,
            "/music/Other%20Band%20-%20Untagged.mp3",
            &[(header::RANGE, range_header)],
        )
        .await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT, "header {range_header}");
        assert_eq!(body.len(), 100);
        assert_eq!(
            header_str(&headers, header::CONTENT_RANGE),
            "bytes 900-999/1000"
        );
    }
}

#[tokio::test]
async fn range_bytes_are_the_right_bytes() {
    let (_dir, app) = setup_test_app();
    // The tagged fixture pads with 0xFF from the end of the tag onward
    let (status, _, body) = get_with_headers(
        &app,
        "/music/Cool%20Band%20-%20Tagged.mp3",
        &[(header::RANGE, "bytes=1990-1999")],
    )
    .await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body, vec![0xFF; 10]);
}

#[tokio::test]
async fn unsatisfiable_range() {
    let (_dir, app) = setup_test_app();
    let (status, headers, body) = get_with_headers(
        &app,
        "/music/Other%20Band%20-%20Untagged.mp3",
        &[(header::RANGE, "bytes=2000-3000")],
    )
    .await;
    assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&headers, header::CONTENT_RANGE), "bytes */1000");
    assert!(body.is_empty());
}

#[tokio::test]
async fn conditional_hit_beats_range() {
    let (_dir, app) = setup_test_app();
    let (_, headers, _) = get(&app, "/music/Other%20Band%20-%20Untagged.mp3").await;
    let etag = header_str(&headers, header::ETAG).to_string();

    let (status, headers, body) = get_with_headers(
        &app,
        "/music/Other%20Band%20-%20Untagged.mp3",
        &[
            (header::IF_NONE_MATCH, etag.as_str()),
            (header::RANGE, "bytes=0-99"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert!(body.is_empty());
    assert_eq!(header_str(&headers, header::ETAG), etag);
}

#[tokio::test]
async fn stale_etag_gets_fresh_bytes() {
    let (_dir, app) = setup_test_app();
    let (status, _, body) = get_with_headers(
        &app,
        "/music/Other%20Band%20-%20Untagged.mp3",
        &[(header::IF_NONE_MATCH, "\"0-0\"")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 1000);
}

#[tokio::test]
async fn missing_media_is_404() {
    let (_dir, app) = setup_test_app();
    let (status, _, _) = get(&app, "/music/ghost.mp3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_is_rejected() {
    let (_dir, app) = setup_test_app();
    let (status, _, _) = get(&app, "/music/..%2F..%2Fetc%2Fpasswd").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_and_static_serving() {
    let (_dir, app) = setup_test_app();
    let (status, headers, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>aria</html>");
    assert_eq!(
        header_str(&headers, header::CACHE_CONTROL),
        "public, max-age=3600"
    );
    let etag = header_str(&headers, header::ETAG).to_string();

    // Conditional revalidation of the same asset
    let (status, _, body) =
        get_with_headers(&app, "/", &[(header::IF_NONE_MATCH, etag.as_str())]).await;
    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert!(body.is_empty());
}

#[tokio::test]
async fn unknown_static_path_is_404() {
    let (_dir, app) = setup_test_app();
    let (status, _, _) = get(&app, "/nope.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn name_and_location_endpoints() {
    let (_dir, app) = setup_test_app();
    let (status, _, body) = get(&app, "/api/name").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["name"], "Admin");

    let (status, _, body) = get(&app, "/api/location").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["lat"], "0");
    assert_eq!(body["long"], "0");
}
