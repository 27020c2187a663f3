use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::error::ApiError;
use crate::utils::capture_group_1;

static VIDEO_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<yt:videoId>(.*?)</yt:videoId>").unwrap());

const SHORT_URL_BASE: &str = "https://youtu.be";

/// Extract the identifier of the newest item from raw feed text.
///
/// Returns the first `<yt:videoId>` element in document order, which is the
/// most recent upload in YouTube's feeds. Truncated or otherwise malformed
/// documents are fine as long as the first element is intact.
pub fn extract_latest_video_id(raw: &str) -> Option<&str> {
    capture_group_1(&VIDEO_ID_REGEX, raw)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Short permalink for a video id.
pub fn video_url(video_id: &str) -> String {
    format!("{SHORT_URL_BASE}/{video_id}")
}

/// Anything that can return the raw text of a feed document.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self, url: &str) -> Result<String, ApiError>;
}

/// Fetches feed documents over HTTP.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_feed(&self, url: &str) -> Result<String, ApiError> {
        let url = url::Url::parse(url).map_err(|e| ApiError::InvalidUrl(format!("{url}: {e}")))?;
        let response = self.client.get(url.as_str()).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        let body = response.text().await?;
        debug!(url = %url, len = body.len(), "Fetched feed document");
        Ok(body)
    }
}
