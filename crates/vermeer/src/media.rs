//! HTTP media fetching.

use async_trait::async_trait;
use vermeer_error::{HttpError, VermeerResult};
use vermeer_interface::MediaFetcher;

/// [`MediaFetcher`] backed by an HTTP client.
///
/// Used to download icons, banners, emoji images, and image attachments
/// for base64 inlining. Downloads bypass the call scheduler: the scheduler
/// models the directory's rate limit, and asset hosts are served
/// separately.
#[derive(Debug, Clone, Default)]
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    /// Create a fetcher with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, url: &str) -> VermeerResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::new(format!("{url}: {e}")))?
            .error_for_status()
            .map_err(|e| HttpError::new(format!("{url}: {e}")))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::new(format!("{url}: {e}")))?;

        tracing::debug!(url, size = bytes.len(), "Fetched media asset");

        Ok(bytes.to_vec())
    }
}
