use std::{path::PathBuf, process::Stdio, time::Duration};

use base64::Engine;
use snafu::{OptionExt, ResultExt};
use smtp_notifier_core::config::MediaConfig;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::{
    entity::MediaSource,
    service::error::{self, Error, Result},
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Schemes `ffmpeg` reads directly to take a snapshot of a live stream.
const STREAM_SCHEMES: [&str; 4] = ["rtsp", "rtsps", "rtmp", "rtmps"];

enum Input {
    Bytes(Vec<u8>),
    Stream(String),
}

/// Turns the media of a notification event into a PNG still.
#[derive(Clone, Debug)]
pub struct MediaConverter {
    http_client: reqwest::Client,
    ffmpeg_path: PathBuf,
    timeout: Duration,
    max_size: usize,
}

impl MediaConverter {
    /// # Errors
    ///
    /// Returns an error if the HTTP client can not be created.
    pub fn new(MediaConfig { ffmpeg_path, timeout, max_size }: &MediaConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(*timeout)
            .build()
            .context(error::BuildHttpClientSnafu)?;

        Ok(Self {
            http_client,
            ffmpeg_path: ffmpeg_path.clone(),
            timeout: *timeout,
            max_size: *max_size,
        })
    }

    /// Largest media accepted before conversion, in bytes.
    #[must_use]
    pub const fn max_size(&self) -> usize { self.max_size }

    /// Resolves `source` and returns it as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the media can not be read, exceeds the size limit or
    /// `ffmpeg` fails to extract a frame.
    pub async fn to_png(&self, source: &MediaSource) -> Result<Vec<u8>> {
        match self.resolve(source).await? {
            Input::Bytes(data) if data.starts_with(&PNG_SIGNATURE) => {
                tracing::debug!("Media is already PNG");
                Ok(data)
            }
            Input::Bytes(data) => self.run_ffmpeg("pipe:0", Some(data)).await,
            Input::Stream(url) => self.run_ffmpeg(&url, None).await,
        }
    }

    async fn resolve(&self, source: &MediaSource) -> Result<Input> {
        let data = match source {
            MediaSource::Inline { data, mime_type } => {
                tracing::debug!(
                    mime_type = mime_type.as_deref().unwrap_or("unknown"),
                    "Decoding inline media"
                );
                decode_base64(data)?
            }
            MediaSource::Url { url } => {
                if let Some(rest) = url.strip_prefix("data:") {
                    decode_data_url(url, rest)?
                } else {
                    let parsed = reqwest::Url::parse(url)
                        .ok()
                        .context(error::InvalidMediaUrlSnafu { url: url.clone() })?;
                    let scheme = parsed.scheme().to_ascii_lowercase();
                    match scheme.as_str() {
                        "http" | "https" => self.fetch(parsed).await?,
                        scheme if STREAM_SCHEMES.contains(&scheme) => {
                            return Ok(Input::Stream(url.clone()));
                        }
                        _ => return Err(Error::UnsupportedMediaScheme { scheme: scheme.clone() }),
                    }
                }
            }
        };

        if data.len() > self.max_size {
            return Err(Error::MediaTooLarge { size: data.len() as u64, limit: self.max_size });
        }
        Ok(Input::Bytes(data))
    }

    async fn fetch(&self, url: reqwest::Url) -> Result<Vec<u8>> {
        tracing::debug!(%url, "Fetching media");

        let url_text = url.to_string();
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .context(error::FetchMediaSnafu { url: url_text.clone() })?;

        if let Some(size) = response.content_length() {
            if size > self.max_size as u64 {
                return Err(Error::MediaTooLarge { size, limit: self.max_size });
            }
        }

        let mut data = Vec::new();
        while let Some(chunk) =
            response.chunk().await.context(error::FetchMediaSnafu { url: url_text.clone() })?
        {
            data.extend_from_slice(&chunk);
            if data.len() > self.max_size {
                return Err(Error::MediaTooLarge { size: data.len() as u64, limit: self.max_size });
            }
        }
        Ok(data)
    }

    async fn run_ffmpeg(&self, input: &str, stdin_data: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.ffmpeg_path);
        let _command = command
            .args(["-hide_banner", "-loglevel", "error", "-i", input])
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "pipe:1"])
            .stdin(if stdin_data.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child =
            command.spawn().context(error::SpawnFfmpegSnafu { path: self.ffmpeg_path.clone() })?;

        if let (Some(data), Some(mut stdin)) = (stdin_data, child.stdin.take()) {
            let _writer = tokio::spawn(async move {
                // ffmpeg stops reading once it has a frame
                if let Err(err) = stdin.write_all(&data).await {
                    tracing::debug!("ffmpeg closed its input early: {err}");
                }
            });
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::FfmpegTimeout)?
            .context(error::SpawnFfmpegSnafu { path: self.ffmpeg_path.clone() })?;

        if output.status.success() && output.stdout.starts_with(&PNG_SIGNATURE) {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("ffmpeg exited with {}", output.status)
            } else {
                stderr
            };
            Err(Error::FfmpegFailed { message })
        }
    }
}

fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let compact: String = data.split_whitespace().collect();
    base64::engine::general_purpose::STANDARD.decode(compact).context(error::DecodeMediaSnafu)
}

/// `rest` is everything after `data:`, `<mime>[;base64],<payload>`.
fn decode_data_url(url: &str, rest: &str) -> Result<Vec<u8>> {
    let (meta, payload) =
        rest.split_once(',').context(error::InvalidMediaUrlSnafu { url: url.to_string() })?;

    if meta.ends_with(";base64") {
        decode_base64(payload)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode, routing, Router};
    use tokio::net::TcpListener;

    use super::*;

    // 1x1 transparent PNG
    const PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn converter(max_size: usize) -> MediaConverter {
        MediaConverter::new(&MediaConfig {
            ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
            timeout: Duration::from_secs(2),
            max_size,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_inline_png_passes_through() {
        let source = MediaSource::Inline { data: PNG.to_string(), mime_type: None };

        let png = converter(1024).to_png(&source).await.unwrap();
        assert!(png.starts_with(&PNG_SIGNATURE));
    }

    #[tokio::test]
    async fn test_data_url_png_passes_through() {
        let source = MediaSource::Url { url: format!("data:image/png;base64,{PNG}") };

        let png = converter(1024).to_png(&source).await.unwrap();
        assert_eq!(png, decode_base64(PNG).unwrap());
    }

    #[tokio::test]
    async fn test_rejects_invalid_base64() {
        let source = MediaSource::Inline { data: "not base64!".to_string(), mime_type: None };

        assert!(matches!(converter(1024).to_png(&source).await, Err(Error::DecodeMedia { .. })));
    }

    #[tokio::test]
    async fn test_rejects_unsupported_scheme() {
        let source = MediaSource::Url { url: "ftp://camera.local/snapshot.jpg".to_string() };

        assert!(matches!(
            converter(1024).to_png(&source).await,
            Err(Error::UnsupportedMediaScheme { scheme }) if scheme == "ftp"
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_url() {
        let source = MediaSource::Url { url: "snapshot.jpg".to_string() };

        assert!(matches!(converter(1024).to_png(&source).await, Err(Error::InvalidMediaUrl { .. })));
    }

    #[tokio::test]
    async fn test_rejects_oversized_media() {
        let source = MediaSource::Inline { data: PNG.to_string(), mime_type: None };

        assert!(matches!(
            converter(16).to_png(&source).await,
            Err(Error::MediaTooLarge { limit: 16, .. })
        ));
    }

    /// Serves snapshots on a local port, returns its base URL.
    async fn serve_snapshots() -> String {
        let router = Router::new()
            .route("/snapshot.png", routing::get(|| async { decode_base64(PNG).unwrap() }))
            .route("/large.jpg", routing::get(|| async { vec![0xFF_u8; 4096] }))
            .route(
                "/live.jpg",
                routing::get(|| async {
                    // chunked, without `Content-Length`
                    Body::from_stream(futures::stream::iter(
                        (0..4).map(|_| Ok::<_, std::io::Error>(vec![0xFF_u8; 512])),
                    ))
                }),
            )
            .route("/gone.jpg", routing::get(|| async { StatusCode::NOT_FOUND }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move { axum::serve(listener, router).await });

        format!("http://{address}")
    }

    #[tokio::test]
    async fn test_fetch_png_passes_through() {
        let base_url = serve_snapshots().await;
        let source = MediaSource::Url { url: format!("{base_url}/snapshot.png") };

        let png = converter(1024).to_png(&source).await.unwrap();
        assert_eq!(png, decode_base64(PNG).unwrap());
    }

    #[tokio::test]
    async fn test_fetch_rejects_declared_length_over_limit() {
        let base_url = serve_snapshots().await;
        let source = MediaSource::Url { url: format!("{base_url}/large.jpg") };

        assert!(matches!(
            converter(1024).to_png(&source).await,
            Err(Error::MediaTooLarge { size: 4096, limit: 1024 })
        ));
    }

    #[tokio::test]
    async fn test_fetch_stops_streamed_body_over_limit() {
        let base_url = serve_snapshots().await;
        let source = MediaSource::Url { url: format!("{base_url}/live.jpg") };

        let result = converter(1024).to_png(&source).await;
        assert!(
            matches!(result, Err(Error::MediaTooLarge { size, limit: 1024 }) if size > 1024),
            "{result:?}"
        );
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let base_url = serve_snapshots().await;
        let url = format!("{base_url}/gone.jpg");
        let source = MediaSource::Url { url: url.clone() };

        let result = converter(1024).to_png(&source).await;
        assert!(matches!(&result, Err(Error::FetchMedia { url: failed, .. }) if *failed == url));
    }

    #[tokio::test]
    async fn test_non_png_needs_ffmpeg() {
        // JPEG start of image marker
        let source = MediaSource::Url { url: "data:image/jpeg;base64,/9j/4AAQSkZJRg==".to_string() };

        assert!(matches!(converter(1024).to_png(&source).await, Err(Error::SpawnFfmpeg { .. })));
    }
}
