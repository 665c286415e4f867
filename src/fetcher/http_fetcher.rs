use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::app::{ConfluenceError, Result};
use crate::config::Config;
use crate::domain::{CommentRecord, Page};
use crate::fetcher::{ListingFetcher, SortMode, TokenProvider};
use crate::normalizer::Normalizer;

/// Reqwest-backed [`ListingFetcher`] against the upstream JSON listing API.
pub struct HttpListingFetcher {
    client: Client,
    base_url: Url,
    tokens: Option<Arc<dyn TokenProvider>>,
    normalizer: Normalizer,
}

impl HttpListingFetcher {
    pub fn new(config: &Config, tokens: Option<Arc<dyn TokenProvider>>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(&config.user_agent)
            .build()?;
        let base_url = Url::parse(&config.api_base_url)?;

        Ok(Self {
            client,
            base_url,
            tokens,
            normalizer: Normalizer::new(),
        })
    }

    /// Point the fetcher at a different base URL. Used by tests against a
    /// mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        if let Some(tokens) = &self.tokens {
            if let Some(token) = tokens.bearer_token() {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ConfluenceError::Unauthorized(format!(
                "upstream rejected the request with {status}"
            )));
        }
        let response = response.error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ListingFetcher for HttpListingFetcher {
    async fn fetch(
        &self,
        feed: &str,
        sort: SortMode,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page> {
        if feed.trim().is_empty() {
            return Err(ConfluenceError::InvalidArgument("empty feed name".into()));
        }
        if limit == 0 {
            return Err(ConfluenceError::InvalidArgument(
                "limit must be positive".into(),
            ));
        }

        let mut url = self
            .endpoint(&format!("r/{feed}/{sort}.json"))
            .map_err(|e| e.for_feed(feed))?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("after", cursor);
        }

        tracing::debug!("fetching {} page for feed {}", sort, feed);
        let body = self.get_bytes(url).await.map_err(|e| e.for_feed(feed))?;

        self.normalizer
            .listing(feed, &body)
            .map_err(|e| e.for_feed(feed))
    }

    async fn comments(&self, feed: &str, post_id: &str) -> Result<Vec<CommentRecord>> {
        if feed.trim().is_empty() || post_id.trim().is_empty() {
            return Err(ConfluenceError::InvalidArgument(
                "empty feed name or post id".into(),
            ));
        }

        let url = self
            .endpoint(&format!("r/{feed}/comments/{post_id}.json"))
            .map_err(|e| e.for_feed(feed))?;

        tracing::debug!("fetching comments for {}/{}", feed, post_id);
        let body = self.get_bytes(url).await.map_err(|e| e.for_feed(feed))?;

        self.normalizer
            .comments(&body)
            .map_err(|e| e.for_feed(feed))
    }
}
