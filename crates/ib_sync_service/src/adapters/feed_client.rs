use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// Longest slice of an error response kept for logs.
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}: {body_excerpt}")]
    Status {
        url: String,
        status: u16,
        body_excerpt: String,
    },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Read access to the upstream reporting API. One request per call, no retry.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetches the raw body of one feed for a normalized (nine digit) GDUN.
    async fn fetch_feed(&self, normalized_id: &str, feed_path: &str) -> Result<String, FetchError>;
}

/// `GET <base>/api/<feed_path>/<normalized_id>`
pub fn feed_url(base_url: &str, feed_path: &str, normalized_id: &str) -> String {
    format!(
        "{}/api/{feed_path}/{normalized_id}",
        base_url.trim_end_matches('/')
    )
}

/// Reporting API client over HTTP.
///
/// Non-success statuses surface as [`FetchError::Status`] so callers never
/// have to sniff error pages out of the body.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
    base_url: String,
}

impl HttpFeedClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_feed(&self, normalized_id: &str, feed_path: &str) -> Result<String, FetchError> {
        let url = feed_url(&self.base_url, feed_path, normalized_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            // Best effort: the excerpt is only for the log line.
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body_excerpt: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::Body { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_feed_url_from_parts() {
        assert_eq!(
            feed_url("http://pnwreport.example.com", "installs", "001234567"),
            "http://pnwreport.example.com/api/installs/001234567"
        );
    }

    #[test]
    fn ignores_trailing_slash_on_base_url() {
        assert_eq!(
            feed_url("http://reports.local:8080/", "srs", "123456789"),
            "http://reports.local:8080/api/srs/123456789"
        );
    }

    #[test]
    fn client_keeps_trimmed_base_url() {
        let client = HttpFeedClient::new("http://reports.local//", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(client.base_url(), "http://reports.local");
    }
}
