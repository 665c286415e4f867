use serde::{Deserialize, Serialize};

/// Directory entry for a subreddit, as returned by the directory search and
/// the subscribed-feeds listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubredditInfo {
    /// Bare feed name usable with the listing fetcher (no "r/" prefix).
    pub name: String,
    /// Display form, "r/" prefix included.
    pub display_name: String,
    pub title: String,
    pub description: String,
    pub subscribers: u64,
    pub url: String,
    /// Opaque continuation key for directory paging.
    pub cursor_key: String,
}
