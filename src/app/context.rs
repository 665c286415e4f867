use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::aggregator::FeedAggregator;
use crate::app::Result;
use crate::comments::CommentTreeBuilder;
use crate::config::Config;
use crate::domain::{AggregatedPage, CommentNode};
use crate::fetcher::http_fetcher::HttpListingFetcher;
use crate::fetcher::{ListingFetcher, SortMode, TokenProvider};
use crate::subscriptions::SubscriptionResolver;
use crate::thumbnail::ThumbnailResolver;

/// Wires together all components: fetcher, aggregator, subscription
/// resolver, thumbnail resolver, comment tree builder.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn ListingFetcher>,
    pub aggregator: FeedAggregator,
    pub subscriptions: SubscriptionResolver,
    pub thumbnails: ThumbnailResolver,
    pub tree_builder: CommentTreeBuilder,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_tokens(config, None)
    }

    pub fn with_tokens(config: Config, tokens: Option<Arc<dyn TokenProvider>>) -> Result<Self> {
        let fetcher: Arc<dyn ListingFetcher> =
            Arc::new(HttpListingFetcher::new(&config, tokens)?);
        let aggregator = FeedAggregator::with_workers(fetcher.clone(), config.fetch_workers)
            .feed_timeout(config.feed_timeout());
        let subscriptions = SubscriptionResolver::new(&config)?;
        let thumbnails = ThumbnailResolver::new(fetcher.clone());

        Ok(Self {
            config,
            fetcher,
            aggregator,
            subscriptions,
            thumbnails,
            tree_builder: CommentTreeBuilder::new(),
        })
    }

    /// The "subscribed" meta-feed: resolve the caller's subscriptions and
    /// aggregate across them. A user subscribed to nothing gets an empty
    /// page, not an error.
    pub async fn subscribed_posts(
        &self,
        token: &str,
        sort: SortMode,
        limit: u32,
        cursors: Option<&HashMap<String, String>>,
        cancel: &CancellationToken,
    ) -> Result<AggregatedPage> {
        let feeds = self.subscriptions.resolve(token).await?;
        if feeds.is_empty() {
            return Ok(AggregatedPage::default());
        }
        self.aggregator
            .aggregate(&feeds, sort, limit, cursors, cancel)
            .await
    }

    /// First usable preview image for a feed, scanning the configured
    /// number of newest items.
    pub async fn feed_thumbnail(&self, feed: &str) -> Result<Option<String>> {
        self.thumbnails
            .first_thumbnail(feed, self.config.thumbnail_scan_depth)
            .await
    }

    /// Fetch one post's flat comment listing and rebuild the reply forest.
    pub async fn post_comments(&self, feed: &str, post_id: &str) -> Result<Vec<CommentNode>> {
        let flat = self.fetcher.comments(feed, post_id).await?;
        Ok(self.tree_builder.build(&flat))
    }
}
