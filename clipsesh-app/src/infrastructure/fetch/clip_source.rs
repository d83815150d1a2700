use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),
}

/// Where the archival pipeline pulls clip media from.
#[async_trait]
pub trait ClipSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

pub struct HttpClipSource {
    http_client: reqwest::Client,
}

impl HttpClipSource {
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { http_client }
    }
}

impl Default for HttpClipSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipSource for HttpClipSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
