use reqwest::{Client, StatusCode};
use url::Url;

use crate::app::{ConfluenceError, Result};
use crate::config::Config;
use crate::domain::SubredditInfo;
use crate::normalizer::Normalizer;

/// Upper bound on subscribed-set pages, against an upstream that never
/// exhausts.
const MAX_SUBSCRIPTION_PAGES: usize = 100;

/// Expands a user's subscribed-feed set into concrete feed names, and pages
/// the subreddit directory for search.
///
/// Tokens are received per call and never stored; an invalid or expired
/// token surfaces as `Unauthorized`, unretried.
pub struct SubscriptionResolver {
    client: Client,
    base_url: Url,
    normalizer: Normalizer,
}

impl SubscriptionResolver {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.api_base_url)?,
            normalizer: Normalizer::new(),
        })
    }

    /// Point the resolver at a different base URL. Used by tests against a
    /// mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    /// The caller's subscribed feed names, bare (no "r/" prefix), paged to
    /// exhaustion: the set drives aggregation fan-out and must be complete.
    pub async fn resolve(&self, token: &str) -> Result<Vec<String>> {
        if token.trim().is_empty() {
            return Err(ConfluenceError::Unauthorized("missing token".into()));
        }

        let mut names = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_SUBSCRIPTION_PAGES {
            let mut url = self.base_url.join("subreddits/mine/subscriber")?;
            url.query_pairs_mut().append_pair("limit", "100");
            if let Some(cursor) = &cursor {
                url.query_pairs_mut().append_pair("after", cursor);
            }

            let body = self.get_bytes(url, Some(token)).await?;
            let (infos, after) = self.normalizer.subreddits(&body)?;
            names.extend(infos.into_iter().map(|info| info.name));

            // a cursor that never advances would page forever
            if after.is_none() || after == cursor {
                tracing::debug!("resolved {} subscribed feeds", names.len());
                return Ok(names);
            }
            cursor = after;
        }

        tracing::warn!(
            "subscription listing still paging after {} pages, truncating",
            MAX_SUBSCRIPTION_PAGES
        );
        Ok(names)
    }

    /// One page of the subreddit directory matching `query`, with a
    /// continuation cursor for the next page.
    pub async fn search_subreddits(
        &self,
        query: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<(Vec<SubredditInfo>, Option<String>)> {
        if query.trim().is_empty() {
            return Err(ConfluenceError::InvalidArgument("empty query".into()));
        }
        if limit == 0 {
            return Err(ConfluenceError::InvalidArgument(
                "limit must be positive".into(),
            ));
        }

        let mut url = self.base_url.join("subreddits/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("after", cursor);
        }

        let body = self.get_bytes(url, None).await?;
        self.normalizer.subreddits(&body)
    }

    async fn get_bytes(&self, url: Url, token: Option<&str>) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let resolver = SubscriptionResolver::new(&Config::default()).unwrap();
        let err = resolver.resolve("  ").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let resolver = SubscriptionResolver::new(&Config::default()).unwrap();
        let err = resolver.search_subreddits("", None, 10).await.unwrap_err();
        assert!(matches!(err, ConfluenceError::InvalidArgument(_)));
    }
}
