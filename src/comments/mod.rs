use std::collections::{HashMap, HashSet};

use crate::domain::{CommentNode, CommentRecord};

/// Rebuilds a nested comment forest from a flat, parent-referenced listing.
///
/// Malformed structure never fails the build: a record whose parent is
/// unknown is promoted to a root, and parent cycles are cut instead of
/// recursing forever. Every input record lands in exactly one place.
#[derive(Clone, Default)]
pub struct CommentTreeBuilder;

impl CommentTreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Returns the forest roots in arrival order.
    ///
    /// Two passes: the first indexes every record by id and groups records
    /// by parent id, siblings kept in arrival-rank order (the source may
    /// interleave nested replies, so pre-sortedness is not assumed). The
    /// second walks depth-first from every top-level or orphan-promoted
    /// root, tracking the active path so a cyclic parent reference cannot
    /// cause unbounded recursion. Records reachable only through a cycle
    /// are emitted last, as childless roots.
    pub fn build(&self, records: &[CommentRecord]) -> Vec<CommentNode> {
        let known: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

        let mut children: HashMap<&str, Vec<&CommentRecord>> = HashMap::new();
        let mut roots: Vec<&CommentRecord> = Vec::new();
        for record in records {
            match record.parent.as_deref() {
                Some(parent) if known.contains(parent) => {
                    children.entry(parent).or_default().push(record);
                }
                // top-level, or orphan promoted to a root
                _ => roots.push(record),
            }
        }
        roots.sort_by_key(|r| r.rank);
        for group in children.values_mut() {
            group.sort_by_key(|r| r.rank);
        }

        let mut placed: HashSet<&str> = HashSet::new();
        let mut path: HashSet<&str> = HashSet::new();
        let mut forest: Vec<CommentNode> = roots
            .iter()
            .map(|&root| Self::attach(root, &children, &mut path, &mut placed))
            .collect();

        // Cycle islands: records whose ancestry never reaches a root. Cut
        // the cycle by emitting them as childless leaves, in arrival order.
        for record in records {
            if !placed.contains(record.id.as_str()) {
                placed.insert(record.id.as_str());
                forest.push(CommentNode::leaf(record.clone()));
            }
        }

        forest
    }

    fn attach<'a>(
        record: &'a CommentRecord,
        children: &HashMap<&str, Vec<&'a CommentRecord>>,
        path: &mut HashSet<&'a str>,
        placed: &mut HashSet<&'a str>,
    ) -> CommentNode {
        placed.insert(&record.id);
        path.insert(&record.id);

        let mut node = CommentNode::leaf(record.clone());
        if let Some(replies) = children.get(record.id.as_str()) {
            for &reply in replies {
                // on-path or already-placed children indicate malformed
                // parent data; skip rather than duplicate or recurse forever
                if path.contains(reply.id.as_str()) || placed.contains(reply.id.as_str()) {
                    continue;
                }
                node.children.push(Self::attach(reply, children, path, placed));
            }
        }

        path.remove(record.id.as_str());
        node
    }
}
