use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::app::{ConfluenceError, Result};
use crate::domain::{AggregatedPage, Post};
use crate::fetcher::{ListingFetcher, SortMode};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// A per-feed failure observed during aggregation, forwarded to the
/// diagnostics channel instead of failing the aggregate.
#[derive(Debug)]
pub struct FeedFailure {
    pub feed: String,
    pub error: ConfluenceError,
}

/// Fans one logical request out across N feeds, merges the surviving pages
/// into one globally sorted timeline bounded by `limit`, and returns one
/// continuation cursor per constituent feed.
pub struct FeedAggregator {
    fetcher: Arc<dyn ListingFetcher>,
    semaphore: Arc<Semaphore>,
    feed_timeout: Duration,
    diagnostics: Option<mpsc::UnboundedSender<FeedFailure>>,
}

impl FeedAggregator {
    pub fn new(fetcher: Arc<dyn ListingFetcher>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn ListingFetcher>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers)),
            feed_timeout: DEFAULT_FEED_TIMEOUT,
            diagnostics: None,
        }
    }

    /// Bound on a single feed's fetch; a feed that exceeds it is treated
    /// exactly like a failed feed instead of stalling the whole merge.
    pub fn feed_timeout(mut self, timeout: Duration) -> Self {
        self.feed_timeout = timeout;
        self
    }

    /// Per-feed failures are sent here; they never fail the aggregate.
    pub fn with_diagnostics(mut self, sink: mpsc::UnboundedSender<FeedFailure>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Merge one page from every feed in `feeds`.
    ///
    /// Fetches are issued concurrently and the call suspends until all have
    /// completed or failed (a partial-results barrier). A single feed's
    /// failure drops that feed from this call; the aggregate itself fails
    /// only when every feed failed, when arguments are invalid, or when
    /// `cancel` fires. Auth rejections propagate unchanged.
    ///
    /// `cursors` holds each feed's continuation cursor from the previous
    /// aggregate call; the returned map holds cursors for exactly the feeds
    /// that reported more content, regardless of where truncation cut.
    pub async fn aggregate(
        &self,
        feeds: &[String],
        sort: SortMode,
        limit: u32,
        cursors: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> Result<AggregatedPage> {
        if feeds.is_empty() {
            return Err(ConfluenceError::InvalidArgument("empty feed set".into()));
        }
        if limit == 0 {
            return Err(ConfluenceError::InvalidArgument(
                "limit must be positive".into(),
            ));
        }

        let mut handles = Vec::with_capacity(feeds.len());
        for feed in feeds {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&self.semaphore);
            let cancel = cancel.clone();
            let feed = feed.clone();
            let cursor = cursors.and_then(|map| map.get(&feed)).cloned();
            let feed_timeout = self.feed_timeout;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");

                let fetch = fetcher.fetch(&feed, sort, limit, cursor.as_deref());
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(ConfluenceError::Cancelled),
                    fetched = tokio::time::timeout(feed_timeout, fetch) => match fetched {
                        Ok(result) => result,
                        Err(_) => Err(ConfluenceError::Timeout(feed.clone())),
                    },
                };
                (feed, result)
            }));
        }

        let mut items: Vec<Post> = Vec::new();
        let mut next_cursors = HashMap::new();
        let mut survivors = 0usize;

        for joined in futures::future::join_all(handles).await {
            let (feed, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!("task join error: {}", e);
                    continue;
                }
            };

            match result {
                Ok(page) => {
                    survivors += 1;
                    if let Some(cursor) = page.next_cursor {
                        next_cursors.insert(feed, cursor);
                    }
                    items.extend(page.items);
                }
                Err(ConfluenceError::Cancelled) => return Err(ConfluenceError::Cancelled),
                Err(e) if e.is_unauthorized() => return Err(e),
                Err(error) => {
                    tracing::warn!("feed {} dropped from aggregate: {}", feed, error);
                    if let Some(sink) = &self.diagnostics {
                        let _ = sink.send(FeedFailure { feed, error });
                    }
                }
            }
        }

        if survivors == 0 {
            return Err(ConfluenceError::AllFeedsFailed);
        }

        items.sort_by(Post::merge_order);
        items.truncate(limit as usize);
        tracing::debug!(
            "merged {} feeds into {} items, {} cursors",
            survivors,
            items.len(),
            next_cursors.len()
        );

        Ok(AggregatedPage {
            items,
            cursors: next_cursors,
        })
    }
}
