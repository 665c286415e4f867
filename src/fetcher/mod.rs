pub mod http_fetcher;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::app::{ConfluenceError, Result};
use crate::domain::{CommentRecord, Page};

/// Feed ordering requested from the upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortMode {
    Hot,
    New,
    Top,
    Rising,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Hot => "hot",
            SortMode::New => "new",
            SortMode::Top => "top",
            SortMode::Rising => "rising",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ConfluenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hot" => Ok(SortMode::Hot),
            "new" => Ok(SortMode::New),
            "top" => Ok(SortMode::Top),
            "rising" => Ok(SortMode::Rising),
            other => Err(ConfluenceError::InvalidArgument(format!(
                "unsupported sort mode '{other}'"
            ))),
        }
    }
}

/// One paged request against a named feed.
///
/// `cursor` must be the opaque value previously returned as `next_cursor`
/// for that exact feed and sort mode; the fetcher does not validate this
/// (the aggregator keeps cursors feed-scoped). A well-formed empty response
/// is an empty [`Page`], not an error. No retries.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    async fn fetch(
        &self,
        feed: &str,
        sort: SortMode,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page>;

    /// The flat comment listing for one post, in arrival order.
    async fn comments(&self, feed: &str, post_id: &str) -> Result<Vec<CommentRecord>>;
}

/// Supplies the bearer credential for authenticated calls.
///
/// The core receives a token value per request; storing, refreshing and
/// validating tokens is the collaborator's job.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed-token provider, enough for callers that refresh out of band.
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
