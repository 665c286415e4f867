use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Post;

/// One page from one feed: items in the feed's own order plus an opaque,
/// feed-scoped continuation cursor. An absent cursor means the feed is
/// exhausted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Post>,
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// The merged, globally sorted, size-bounded result of fanning one request
/// across multiple feeds.
///
/// Continuation state is one cursor per constituent feed, not one global
/// cursor: total order only exists after the merge, so the aggregate must
/// remember where each feed stopped. A feed absent from `cursors` is
/// exhausted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedPage {
    pub items: Vec<Post>,
    pub cursors: HashMap<String, String>,
}

impl AggregatedPage {
    pub fn cursor_for(&self, feed: &str) -> Option<&str> {
        self.cursors.get(feed).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_exhaustion() {
        assert!(Page::empty().is_exhausted());
        let page = Page {
            items: Vec::new(),
            next_cursor: Some("t3_abc".into()),
        };
        assert!(!page.is_exhausted());
    }

    #[test]
    fn test_cursor_lookup() {
        let mut aggregated = AggregatedPage::default();
        aggregated.cursors.insert("rust".into(), "t3_abc".into());
        assert_eq!(aggregated.cursor_for("rust"), Some("t3_abc"));
        assert_eq!(aggregated.cursor_for("science"), None);
    }
}
