use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use serde::Deserialize;
use serde_json::Value;

use crate::app::{ConfluenceError, Result};
use crate::domain::{CommentRecord, Page, Post, SubredditInfo};

/// Upstream listing envelope: `{"kind": "Listing", "data": {...}}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    kind: String,
    data: Value,
}

/// Converts raw upstream JSON into domain models.
///
/// The upstream scatters optional fields and nests replies inside their
/// parent's payload; everything shape-related is absorbed here so the
/// aggregation and tree-building algorithms see uniform structs.
#[derive(Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// One feed page. An empty `children` array is an empty page, not an
    /// error; an absent or empty `after` means the feed is exhausted.
    pub fn listing(&self, feed: &str, body: &[u8]) -> Result<Page> {
        let envelope: Envelope =
            serde_json::from_slice(body).map_err(|e| ConfluenceError::Parse(e.to_string()))?;

        let items = envelope
            .data
            .children
            .iter()
            .filter(|child| child.kind == "t3")
            .filter_map(|child| Self::post(feed, &child.data))
            .collect();

        Ok(Page {
            items,
            next_cursor: envelope.data.after.filter(|a| !a.is_empty()),
        })
    }

    /// The flat comment listing for one post, arrival ranks assigned by a
    /// depth-first walk. The upstream nests replies inside their parent's
    /// payload (and uses `""` instead of an empty listing), so the flat
    /// order here is exactly the payload's visit order.
    pub fn comments(&self, body: &[u8]) -> Result<Vec<CommentRecord>> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ConfluenceError::Parse(e.to_string()))?;

        // A post's comment endpoint returns [post listing, comment listing];
        // tolerate a bare listing as well.
        let listing = match value.as_array() {
            Some(parts) => parts.get(1).cloned().unwrap_or(Value::Null),
            None => value,
        };

        let mut records = Vec::new();
        let mut rank = 0;
        Self::walk_comments(&listing, &mut records, &mut rank);
        Ok(records)
    }

    /// One subreddit-directory page (search results or the subscribed set).
    pub fn subreddits(&self, body: &[u8]) -> Result<(Vec<SubredditInfo>, Option<String>)> {
        let envelope: Envelope =
            serde_json::from_slice(body).map_err(|e| ConfluenceError::Parse(e.to_string()))?;

        let infos = envelope
            .data
            .children
            .iter()
            .filter(|child| child.kind == "t5")
            .filter_map(|child| Self::subreddit(&child.data))
            .collect();

        Ok((infos, envelope.data.after.filter(|a| !a.is_empty())))
    }

    fn post(feed: &str, data: &Value) -> Option<Post> {
        let id = data["id"].as_str()?.to_string();
        let created = data["created_utc"].as_f64().unwrap_or(0.0);

        Some(Post {
            feed: data["subreddit"]
                .as_str()
                .unwrap_or(feed)
                .to_string(),
            title: decode(data["title"].as_str().unwrap_or_default()),
            author: data["author"].as_str().unwrap_or("[deleted]").to_string(),
            created_at: DateTime::from_timestamp(created as i64, 0)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            preview_url: data
                .pointer("/preview/images/0/source/url")
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
                .map(decode),
            thumbnail: data["thumbnail"]
                .as_str()
                .filter(|t| !t.is_empty())
                .map(String::from),
            selftext: data["selftext"]
                .as_str()
                .filter(|s| !s.is_empty())
                .map(decode),
            score: data["score"].as_i64().unwrap_or(0),
            num_comments: data["num_comments"].as_u64().unwrap_or(0),
            permalink: data["permalink"].as_str().map(String::from),
            cursor_key: data["name"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("t3_{id}")),
            id,
        })
    }

    fn walk_comments(listing: &Value, records: &mut Vec<CommentRecord>, rank: &mut usize) {
        let children = match listing.pointer("/data/children").and_then(Value::as_array) {
            Some(children) => children,
            None => return,
        };

        for child in children {
            // "more" stubs carry no comment payload
            if child["kind"].as_str() != Some("t1") {
                continue;
            }
            let data = &child["data"];
            let id = match data["id"].as_str() {
                Some(id) => id.to_string(),
                None => continue,
            };

            records.push(CommentRecord {
                id,
                body: decode(data["body"].as_str().unwrap_or_default()),
                author: data["author"].as_str().unwrap_or("[deleted]").to_string(),
                parent: data["parent_id"].as_str().and_then(parse_parent),
                rank: *rank,
            });
            *rank += 1;

            // replies is "" when there are none, a nested listing otherwise
            let replies = &data["replies"];
            if replies.is_object() {
                Self::walk_comments(replies, records, rank);
            }
        }
    }

    fn subreddit(data: &Value) -> Option<SubredditInfo> {
        let name = data["display_name"].as_str()?.to_string();
        Some(SubredditInfo {
            display_name: data["display_name_prefixed"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("r/{name}")),
            title: decode(data["title"].as_str().unwrap_or_default()),
            description: decode(data["public_description"].as_str().unwrap_or_default()),
            subscribers: data["subscribers"].as_u64().unwrap_or(0),
            url: data["url"].as_str().unwrap_or_default().to_string(),
            cursor_key: data["name"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("t5_{name}")),
            name,
        })
    }
}

/// Prefixed parent references: `t1_x` is another comment, `t3_x` is the
/// post itself, i.e. the top-level root marker.
fn parse_parent(parent_id: &str) -> Option<String> {
    parent_id.strip_prefix("t1_").map(String::from)
}

fn decode(raw: &str) -> String {
    decode_html_entities(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_sample() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "kind": "Listing",
            "data": {
                "after": "t3_second",
                "children": [
                    {
                        "kind": "t3",
                        "data": {
                            "id": "first",
                            "name": "t3_first",
                            "subreddit": "rust",
                            "title": "Borrowing &amp; ownership",
                            "author": "ferris",
                            "created_utc": 1700000100.0,
                            "selftext": "",
                            "thumbnail": "self",
                            "score": 42,
                            "num_comments": 7,
                            "permalink": "/r/rust/comments/first/"
                        }
                    },
                    {
                        "kind": "t3",
                        "data": {
                            "id": "second",
                            "name": "t3_second",
                            "subreddit": "rust",
                            "title": "Pinned screenshot",
                            "author": "someone",
                            "created_utc": 1700000000.0,
                            "selftext": "body text",
                            "thumbnail": "https://thumbs.example/x.png",
                            "preview": {
                                "images": [
                                    {"source": {"url": "https://preview.example/x.png?a=1&amp;b=2"}}
                                ]
                            },
                            "score": 1,
                            "num_comments": 0,
                            "permalink": "/r/rust/comments/second/"
                        }
                    }
                ]
            }
        }))
        .unwrap()
    }

    fn comments_sample() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!([
            {"kind": "Listing", "data": {"children": []}},
            {
                "kind": "Listing",
                "data": {
                    "children": [
                        {
                            "kind": "t1",
                            "data": {
                                "id": "c1",
                                "body": "top level",
                                "author": "a",
                                "parent_id": "t3_first",
                                "replies": {
                                    "kind": "Listing",
                                    "data": {
                                        "children": [
                                            {
                                                "kind": "t1",
                                                "data": {
                                                    "id": "c2",
                                                    "body": "nested reply",
                                                    "author": "b",
                                                    "parent_id": "t1_c1",
                                                    "replies": ""
                                                }
                                            }
                                        ]
                                    }
                                }
                            }
                        },
                        {
                            "kind": "t1",
                            "data": {
                                "id": "c3",
                                "body": "second top level",
                                "author": "c",
                                "parent_id": "t3_first",
                                "replies": ""
                            }
                        },
                        {"kind": "more", "data": {"count": 12}}
                    ]
                }
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_listing_normalization() {
        let page = Normalizer::new().listing("rust", &listing_sample()).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("t3_second"));

        let first = &page.items[0];
        assert_eq!(first.id, "first");
        assert_eq!(first.feed, "rust");
        assert_eq!(first.title, "Borrowing & ownership");
        assert_eq!(first.selftext, None);
        assert_eq!(first.thumbnail.as_deref(), Some("self"));
        assert_eq!(first.preview_url, None);
        assert_eq!(first.cursor_key, "t3_first");

        let second = &page.items[1];
        assert_eq!(
            second.preview_url.as_deref(),
            Some("https://preview.example/x.png?a=1&b=2")
        );
        assert_eq!(second.selftext.as_deref(), Some("body text"));
    }

    #[test]
    fn test_empty_listing_is_exhausted_page() {
        let body = serde_json::to_vec(&serde_json::json!({
            "kind": "Listing",
            "data": {"after": null, "children": []}
        }))
        .unwrap();

        let page = Normalizer::new().listing("rust", &body).unwrap();
        assert!(page.items.is_empty());
        assert!(page.is_exhausted());
    }

    #[test]
    fn test_malformed_listing_is_parse_error() {
        let err = Normalizer::new().listing("rust", b"not json").unwrap_err();
        assert!(matches!(err, ConfluenceError::Parse(_)));
    }

    #[test]
    fn test_comment_flattening_assigns_depth_first_ranks() {
        let records = Normalizer::new().comments(&comments_sample()).unwrap();

        // c2 arrives nested inside c1's payload, before its sibling c3
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2", "c3"]);
        let ranks: Vec<usize> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, [0, 1, 2]);

        assert_eq!(records[0].parent, None);
        assert_eq!(records[1].parent.as_deref(), Some("c1"));
        assert_eq!(records[2].parent, None);
    }

    #[test]
    fn test_more_stubs_are_skipped() {
        let records = Normalizer::new().comments(&comments_sample()).unwrap();
        assert!(records.iter().all(|r| !r.body.is_empty()));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_subreddit_directory() {
        let body = serde_json::to_vec(&serde_json::json!({
            "kind": "Listing",
            "data": {
                "after": "t5_xyz",
                "children": [
                    {
                        "kind": "t5",
                        "data": {
                            "name": "t5_abc",
                            "display_name": "rust",
                            "display_name_prefixed": "r/rust",
                            "title": "The Rust Programming Language",
                            "public_description": "A place for all things Rust",
                            "subscribers": 300000,
                            "url": "/r/rust/"
                        }
                    }
                ]
            }
        }))
        .unwrap();

        let (infos, after) = Normalizer::new().subreddits(&body).unwrap();
        assert_eq!(after.as_deref(), Some("t5_xyz"));
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "rust");
        assert_eq!(infos[0].display_name, "r/rust");
        assert_eq!(infos[0].subscribers, 300000);
        assert_eq!(infos[0].cursor_key, "t5_abc");
    }
}
