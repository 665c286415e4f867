use std::sync::Arc;

use crate::app::Result;
use crate::fetcher::{ListingFetcher, SortMode};

/// Thumbnail values the upstream uses as placeholders instead of a URL.
const PLACEHOLDER_THUMBNAILS: &[&str] = &["self", "default", "nsfw", "spoiler", "image"];

/// Scans a feed's newest items for the first usable preview image.
pub struct ThumbnailResolver {
    fetcher: Arc<dyn ListingFetcher>,
}

impl ThumbnailResolver {
    pub fn new(fetcher: Arc<dyn ListingFetcher>) -> Self {
        Self { fetcher }
    }

    /// The first usable image URL among the feed's `scan_depth` newest
    /// items: a full preview if present, otherwise a thumbnail that is a
    /// real URL rather than a placeholder sentinel. `None` when the feed is
    /// empty or nothing usable turns up; an empty feed is not an error.
    pub async fn first_thumbnail(&self, feed: &str, scan_depth: u32) -> Result<Option<String>> {
        if scan_depth == 0 {
            return Ok(None);
        }

        let page = self
            .fetcher
            .fetch(feed, SortMode::New, scan_depth, None)
            .await?;

        for item in page.items.iter().take(scan_depth as usize) {
            if let Some(preview) = &item.preview_url {
                return Ok(Some(preview.clone()));
            }
            if let Some(thumbnail) = &item.thumbnail {
                if !PLACEHOLDER_THUMBNAILS.contains(&thumbnail.as_str()) {
                    return Ok(Some(thumbnail.clone()));
                }
            }
        }

        Ok(None)
    }
}
