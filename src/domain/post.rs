use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single content record within a feed.
///
/// `id` is unique within a feed but not globally; the (feed, id) pair is the
/// true key. Posts are constructed fresh per response and immutable after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Originating feed name.
    pub feed: String,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    /// Full-size preview image, when the upstream supplied one.
    pub preview_url: Option<String>,
    /// Raw thumbnail field. May be a placeholder sentinel ("self",
    /// "default", "nsfw", ...) rather than a URL.
    pub thumbnail: Option<String>,
    pub selftext: Option<String>,
    pub score: i64,
    pub num_comments: u64,
    pub permalink: Option<String>,
    /// Opaque per-item continuation key the upstream accepts as `after`.
    pub cursor_key: String,
}

impl Post {
    /// Total order used by the aggregator: creation instant descending,
    /// ties broken by feed name then id for determinism.
    pub fn merge_order(&self, other: &Post) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| self.feed.cmp(&other.feed))
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(feed: &str, id: &str, secs: i64) -> Post {
        Post {
            id: id.into(),
            feed: feed.into(),
            title: format!("{feed}/{id}"),
            author: "someone".into(),
            created_at: DateTime::from_timestamp(secs, 0).unwrap(),
            preview_url: None,
            thumbnail: None,
            selftext: None,
            score: 0,
            num_comments: 0,
            permalink: None,
            cursor_key: format!("t3_{id}"),
        }
    }

    #[test]
    fn test_merge_order_newest_first() {
        let newer = post("rust", "a", 100);
        let older = post("rust", "b", 50);
        assert_eq!(newer.merge_order(&older), Ordering::Less);
        assert_eq!(older.merge_order(&newer), Ordering::Greater);
    }

    #[test]
    fn test_merge_order_ties_broken_by_feed_then_id() {
        let a = post("rust", "x", 100);
        let b = post("science", "x", 100);
        assert_eq!(a.merge_order(&b), Ordering::Less);

        let c = post("rust", "a", 100);
        let d = post("rust", "b", 100);
        assert_eq!(c.merge_order(&d), Ordering::Less);
    }
}
