use serde::{Deserialize, Serialize};

/// One comment as it arrives in the flat source listing.
///
/// `parent` of `None` marks a top-level comment (the upstream uses a link
/// marker, which the normalizer strips). `rank` is the record's position in
/// the flat listing and is the stable tiebreak for sibling order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub body: String,
    pub author: String,
    pub parent: Option<String>,
    pub rank: usize,
}

/// A comment plus its replies, children ordered by arrival rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
    pub record: CommentRecord,
    pub children: Vec<CommentNode>,
}

// len counts the node itself, so a subtree is never empty
#[allow(clippy::len_without_is_empty)]
impl CommentNode {
    pub fn leaf(record: CommentRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    /// Number of comments in this subtree, the node itself included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(CommentNode::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, parent: Option<&str>, rank: usize) -> CommentRecord {
        CommentRecord {
            id: id.into(),
            body: format!("body {id}"),
            author: "someone".into(),
            parent: parent.map(String::from),
            rank,
        }
    }

    #[test]
    fn test_subtree_len() {
        let mut root = CommentNode::leaf(record("1", None, 0));
        root.children.push(CommentNode::leaf(record("2", Some("1"), 1)));
        root.children.push(CommentNode::leaf(record("3", Some("1"), 2)));
        assert_eq!(root.len(), 3);
    }
}
