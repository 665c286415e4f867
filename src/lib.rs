//! # Confluence
//!
//! A client-side aggregation core for a Reddit-style content API:
//! multi-feed timeline merging and comment-tree reconstruction.
//!
//! ## Architecture
//!
//! Confluence follows a modular pipeline architecture:
//!
//! ```text
//! SubscriptionResolver → FeedAggregator → ListingFetcher (×N) → merge/sort/truncate
//!                                          Normalizer ─→ CommentTreeBuilder
//! ```
//!
//! - [`fetcher`]: one paged request against a named feed, normalized into a typed [`Page`](domain::Page)
//! - [`aggregator`]: concurrent fan-out across N feeds, merged into one cursor-paged timeline
//! - [`comments`]: flat, depth-bounded comment listings rebuilt into a bounded forest
//! - [`normalizer`]: raw JSON envelopes converted to unified domain models
//!
//! There is no UI, persistence, or CLI here: rendering and token storage are
//! collaborators that consume the aggregated pages and comment forests by value.

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// fetcher, aggregator, subscription resolver, thumbnail resolver.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/confluence/config.toml`, supporting:
/// - API base URL and user agent
/// - Request, per-feed timeout and worker bounds
pub mod config;

/// Core domain models.
///
/// - [`Post`](domain::Post): a single content record within a feed
/// - [`Page`](domain::Page) / [`AggregatedPage`](domain::AggregatedPage): cursor-paged listings
/// - [`CommentRecord`](domain::CommentRecord) / [`CommentNode`](domain::CommentNode): flat and nested comments
pub mod domain;

/// Paged listing fetching.
///
/// - [`ListingFetcher`](fetcher::ListingFetcher): async trait for one-feed paged requests
/// - [`HttpListingFetcher`](fetcher::http_fetcher::HttpListingFetcher): reqwest-based implementation
/// - [`TokenProvider`](fetcher::TokenProvider): bearer-credential seam (tokens are never stored here)
pub mod fetcher;

/// Raw listing normalization.
///
/// Converts the upstream JSON envelope (listings, nested comment payloads,
/// subreddit directories) into unified domain structs.
pub mod normalizer;

/// Multi-feed aggregation.
///
/// [`FeedAggregator`](aggregator::FeedAggregator) fans one logical request out
/// across N feeds concurrently, merges the surviving pages into one globally
/// sorted, size-bounded timeline, and keeps one continuation cursor per feed.
pub mod aggregator;

/// Comment-tree reconstruction.
///
/// [`CommentTreeBuilder`](comments::CommentTreeBuilder) turns a flat comment
/// listing into a forest, preserving arrival order among siblings, promoting
/// orphans to roots and cutting parent cycles instead of recursing forever.
pub mod comments;

/// Subscribed-feed resolution and subreddit directory search.
pub mod subscriptions;

/// First-usable-preview-image scanning over a feed's newest items.
pub mod thumbnail;
