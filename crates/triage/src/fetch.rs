//! Image retrieval and media-type inference.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::{EncodedImage, ImageReference, Stage, TriageConfig, TriageError};

pub const MEDIA_PNG: &str = "image/png";
pub const MEDIA_WEBP: &str = "image/webp";
pub const MEDIA_JPEG: &str = "image/jpeg";

/// Media type implied by the reference's path suffix.
///
/// Query string and fragment are ignored and matching is case-insensitive.
/// Unknown suffixes fall back to JPEG rather than being rejected.
pub fn media_type_for(reference: &str) -> &'static str {
    let lower = reference.to_ascii_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    if path.ends_with(".png") {
        MEDIA_PNG
    } else if path.ends_with(".webp") {
        MEDIA_WEBP
    } else {
        // .jpg, .jpeg and everything unrecognized
        MEDIA_JPEG
    }
}

/// Downloads one image per call and encodes it for inline transport.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: reqwest::Client,
    deadline: Duration,
    max_bytes: Option<u64>,
}

impl ImageFetcher {
    pub fn new(cfg: &TriageConfig) -> Result<Self, TriageError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TriageError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self::with_client(http, cfg))
    }

    /// Reuse an existing connection pool.
    pub fn with_client(http: reqwest::Client, cfg: &TriageConfig) -> Self {
        Self {
            http,
            deadline: cfg.fetch_deadline(),
            max_bytes: cfg.max_image_bytes,
        }
    }

    /// Single attempt, bounded by the fetch deadline. Any failure is final.
    pub async fn fetch(&self, reference: &ImageReference) -> Result<EncodedImage, TriageError> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.deadline, self.fetch_inner(reference)).await {
            Ok(result) => result,
            Err(_) => Err(TriageError::Timeout {
                stage: Stage::Fetching,
                after_ms: self.deadline.as_millis() as u64,
            }),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(image) => debug!(
                media_type = image.media_type,
                encoded_len = image.payload.len(),
                elapsed_ms,
                "fetch_success"
            ),
            Err(err) => warn!(
                reference = %reference,
                error = %err,
                elapsed_ms,
                "fetch_failure"
            ),
        }
        result
    }

    async fn fetch_inner(&self, reference: &ImageReference) -> Result<EncodedImage, TriageError> {
        let mut response = self
            .http
            .get(reference.as_str())
            .send()
            .await
            .map_err(|e| TriageError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::FetchStatus {
                status: status.as_u16(),
                url: reference.to_string(),
            });
        }

        if let (Some(limit), Some(declared)) = (self.max_bytes, response.content_length()) {
            if declared > limit {
                return Err(TriageError::ImageTooLarge {
                    size: declared,
                    limit,
                });
            }
        }

        // Chunked bodies carry no length, so the cap is enforced while reading.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| TriageError::Fetch(e.to_string()))?
        {
            bytes.extend_from_slice(&chunk);
            if let Some(limit) = self.max_bytes {
                let size = bytes.len() as u64;
                if size > limit {
                    return Err(TriageError::ImageTooLarge { size, limit });
                }
            }
        }

        Ok(EncodedImage {
            media_type: media_type_for(reference.as_str()),
            payload: BASE64.encode(&bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn media_type_known_suffixes() {
        assert_eq!(media_type_for("a.png"), "image/png");
        assert_eq!(media_type_for("a.WEBP?x=1"), "image/webp");
        assert_eq!(media_type_for("https://cdn.example/p/photo.jpg"), "image/jpeg");
        assert_eq!(media_type_for("https://cdn.example/p/photo.JPEG#frag"), "image/jpeg");
        assert_eq!(media_type_for("https://cdn.example/shot.PNG?w=200&h=100"), "image/png");
    }

    #[test]
    fn media_type_defaults_to_jpeg() {
        assert_eq!(media_type_for("a.gif"), "image/jpeg");
        assert_eq!(media_type_for("https://cdn.example/image"), "image/jpeg");
        assert_eq!(media_type_for("https://cdn.example/a.png.txt"), "image/jpeg");
        // Only the path decides; a suffix inside the query does not count.
        assert_eq!(media_type_for("https://cdn.example/x?name=a.png"), "image/jpeg");
    }

    fn reference(server: &MockServer, p: &str) -> ImageReference {
        ImageReference::parse(&format!("{}{p}", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn fetch_encodes_body_as_base64() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pics/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(&TriageConfig::default()).unwrap();
        let image = fetcher.fetch(&reference(&server, "/pics/cat.png")).await.unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.payload, "aGVsbG8=");
    }

    #[tokio::test]
    async fn fetch_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ImageFetcher::new(&TriageConfig::default()).unwrap();
        let err = fetcher
            .fetch(&reference(&server, "/missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::FetchStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn fetch_respects_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"slow".to_vec())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let cfg = TriageConfig {
            fetch_timeout_ms: 50,
            ..Default::default()
        };
        let fetcher = ImageFetcher::new(&cfg).unwrap();
        let err = fetcher.fetch(&reference(&server, "/slow.png")).await.unwrap_err();
        assert_eq!(
            err,
            TriageError::Timeout {
                stage: Stage::Fetching,
                after_ms: 50
            }
        );
    }

    #[tokio::test]
    async fn fetch_rejects_oversized_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
            .mount(&server)
            .await;

        let cfg = TriageConfig {
            max_image_bytes: Some(16),
            ..Default::default()
        };
        let fetcher = ImageFetcher::new(&cfg).unwrap();
        let err = fetcher.fetch(&reference(&server, "/big.webp")).await.unwrap_err();
        assert!(matches!(
            err,
            TriageError::ImageTooLarge { size: 64, limit: 16 }
        ));
    }

    /// Origin that streams 1 KiB chunks without a `Content-Length` until the peer hangs up.
    async fn endless_chunked_origin() -> ImageReference {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\n\r\n";
            if socket.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            let mut chunk = b"400\r\n".to_vec();
            chunk.extend_from_slice(&[0u8; 1024]);
            chunk.extend_from_slice(b"\r\n");
            while socket.write_all(&chunk).await.is_ok() {}
        });
        ImageReference::parse(&format!("http://{addr}/stream.png")).unwrap()
    }

    #[tokio::test]
    async fn fetch_caps_chunked_body_while_streaming() {
        let cfg = TriageConfig {
            max_image_bytes: Some(16),
            fetch_timeout_ms: 5_000,
            ..Default::default()
        };
        let fetcher = ImageFetcher::new(&cfg).unwrap();
        let start = Instant::now();
        let err = fetcher.fetch(&endless_chunked_origin().await).await.unwrap_err();

        match err {
            TriageError::ImageTooLarge { size, limit } => {
                assert_eq!(limit, 16);
                assert!(size > 16);
                assert!(size <= 64 * 1024, "read {size} bytes past the cap");
            }
            other => panic!("expected ImageTooLarge, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn fetch_connection_refused_is_fetch_error() {
        let fetcher = ImageFetcher::new(&TriageConfig::default()).unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let reference = ImageReference::parse("http://127.0.0.1:9/a.png").unwrap();
        let err = fetcher.fetch(&reference).await.unwrap_err();
        assert!(matches!(err, TriageError::Fetch(_)));
    }
}
