//! Track loading seam
//!
//! `TrackSource` abstracts where track bytes and metadata come from, so
//! the session logic can be exercised against counting/failing mocks.
//! `HttpTrackSource` is the production implementation, talking to an
//! aria-ms instance over HTTP.

use crate::{Error, Result};
use aria_common::TrackMetadata;
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

/// A fully loaded track resource: the opaque audio handle held by the
/// playback cache.
#[derive(Debug, Clone)]
pub struct LoadedTrack {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Duration reported by the codec after probing the loaded bytes.
    /// Takes precedence over server-derived duration when finite.
    pub codec_duration: Option<f64>,
}

/// Source of track bytes and metadata.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Fetch and fully load a track resource.
    async fn load(&self, filename: &str) -> Result<LoadedTrack>;

    /// Fetch resolved metadata for a track.
    async fn fetch_metadata(&self, filename: &str) -> Result<TrackMetadata>;

    /// Fetch the server's (shuffled) track list.
    async fn fetch_track_list(&self) -> Result<Vec<String>>;
}

/// HTTP-backed track source against an aria-ms server.
#[derive(Debug, Clone)]
pub struct HttpTrackSource {
    base: Url,
    client: reqwest::Client,
}

impl HttpTrackSource {
    pub fn new(server_url: &str) -> Result<Self> {
        // A trailing slash makes Url::join treat the base as a directory
        let normalized = if server_url.ends_with('/') {
            server_url.to_string()
        } else {
            format!("{server_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|e| Error::InvalidUrl(format!("{server_url}: {e}")))?;
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str, filename: &str) -> Result<Url> {
        // Url::join percent-encodes characters that are invalid in paths
        self.base
            .join(&format!("{path}/{filename}"))
            .map_err(|e| Error::InvalidUrl(format!("{path}/{filename}: {e}")))
    }
}

#[async_trait]
impl TrackSource for HttpTrackSource {
    async fn load(&self, filename: &str) -> Result<LoadedTrack> {
        let url = self.endpoint("music", filename)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Server {
                status: response.status().as_u16(),
                filename: filename.to_string(),
            });
        }
        // Bytes clones are reference counted, so the probe reads the same
        // buffer the track keeps.
        let body = response.bytes().await?;
        let codec_duration = probe_duration(body.clone(), filename);
        debug!(filename, len = body.len(), ?codec_duration, "loaded track");
        Ok(LoadedTrack {
            filename: filename.to_string(),
            bytes: body.to_vec(),
            codec_duration,
        })
    }

    async fn fetch_metadata(&self, filename: &str) -> Result<TrackMetadata> {
        let url = self.endpoint("api/metadata", filename)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Server {
                status: response.status().as_u16(),
                filename: filename.to_string(),
            });
        }
        Ok(response.json::<TrackMetadata>().await?)
    }

    async fn fetch_track_list(&self) -> Result<Vec<String>> {
        let url = self
            .base
            .join("api/music")
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Server {
                status: response.status().as_u16(),
                filename: "api/music".to_string(),
            });
        }
        Ok(response.json::<Vec<String>>().await?)
    }
}

/// Probe the loaded bytes for a codec-reported duration.
///
/// Best-effort: `None` when the container is unknown to the probe (Opus,
/// for one) or carries no frame count. The session then falls back to the
/// server-derived duration.
fn probe_duration<B>(bytes: B, filename: &str) -> Option<f64>
where
    B: AsRef<[u8]> + Send + Sync + 'static,
{
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let mss = MediaSourceStream::new(
        Box::new(std::io::Cursor::new(bytes)),
        Default::default(),
    );

    let mut hint = Hint::new();
    if let Some((_, extension)) = filename.rsplit_once('.') {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .ok()?;

    let track = probed.format.default_track()?;
    let time_base = track.codec_params.time_base?;
    let n_frames = track.codec_params.n_frames?;
    let time = time_base.calc_time(n_frames);
    let seconds = time.seconds as f64 + time.frac;
    seconds.is_finite().then_some(seconds)
}
