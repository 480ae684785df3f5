//! Building a [`DuTree`] from `(path segments, size)` records

use super::group::{matching_group, FileGroup};
use super::{DuTree, NodeId};
use indextree::NodeEdge;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// What to do when the same path is reported more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later records overwrite earlier ones
    #[default]
    LastWins,
    /// The first record is kept and later ones are logged and ignored
    KeepFirst,
}

/// Accumulates report records into a tree.
///
/// The name index used for find-or-create lookups belongs to the builder and
/// is dropped by [`TreeBuilder::finish`], so the finished tree carries no
/// lookup tables.
pub struct TreeBuilder {
    tree: DuTree,
    /// parent -> child name -> child
    index: HashMap<NodeId, HashMap<String, NodeId>>,
    policy: DuplicatePolicy,
    groups: Vec<FileGroup>,
    records: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl TreeBuilder {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            tree: DuTree::new(),
            index: HashMap::new(),
            policy,
            groups: Vec::new(),
            records: 0,
        }
    }

    /// File leaves matching one of `groups` under a node named after the group
    pub fn with_groups(mut self, groups: Vec<FileGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// Number of records inserted so far
    pub fn records(&self) -> usize {
        self.records
    }

    /// Link a path into the tree and set its node's size.
    ///
    /// Empty segments are ignored; a record with no segments sets the size of
    /// the root itself. When the last segment matches a group, a node named
    /// after the group is inserted above it. The group node's size is the sum
    /// of its members.
    pub fn insert<S: AsRef<str>>(&mut self, segments: &[S], size: u64) -> NodeId {
        let mut segments = segments
            .iter()
            .map(S::as_ref)
            .filter(|segment| !segment.is_empty())
            .peekable();

        let mut node = self.tree.root();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                if let Some(group) = matching_group(&self.groups, segment) {
                    let group_name = group.name.clone();
                    node = self.find_or_create_child(node, &group_name);
                }
            }
            node = self.find_or_create_child(node, segment);
        }
        self.records += 1;

        match (self.tree.node(node).size, self.policy) {
            (Some(existing), DuplicatePolicy::KeepFirst) => {
                warn!(
                    path = %self.tree.path_of(node),
                    existing,
                    ignored = size,
                    "duplicate report entry, keeping first size"
                );
            }
            (Some(existing), DuplicatePolicy::LastWins) => {
                debug!(
                    path = %self.tree.path_of(node),
                    existing,
                    size,
                    "duplicate report entry, overwriting size"
                );
                self.tree.node_mut(node).size = Some(size);
            }
            (None, _) => self.tree.node_mut(node).size = Some(size),
        }

        node
    }

    fn find_or_create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(&child) = self.index.get(&parent).and_then(|names| names.get(name)) {
            return child;
        }

        let child = self.tree.append_child(parent, name);
        self.index
            .entry(parent)
            .or_default()
            .insert(name.to_string(), child);
        child
    }

    /// Compute the derived aggregates and hand out the finished tree
    pub fn finish(self) -> DuTree {
        let TreeBuilder {
            mut tree,
            index,
            records,
            ..
        } = self;
        drop(index);

        tree.fix_sizes();
        tree.fix_descendants();

        let root = tree.root();
        info!(
            records,
            nodes = tree.node_count(),
            total_size = tree.node(root).size(),
            "report tree built"
        );
        tree
    }
}

impl DuTree {
    /// Nodes in post-order: every node comes after all of its descendants
    fn post_order(&self) -> Vec<NodeId> {
        self.root
            .traverse(&self.arena)
            .filter_map(|edge| match edge {
                NodeEdge::End(id) => Some(id),
                NodeEdge::Start(_) => None,
            })
            .collect()
    }

    /// Give every node without a reported size the sum of its children's sizes
    fn fix_sizes(&mut self) {
        for id in self.post_order() {
            if self.node(id).size.is_some() {
                continue;
            }
            let total = self
                .children(id)
                .fold(0u64, |acc, child| acc.saturating_add(self.node(child).size()));
            self.node_mut(id).size = Some(total);
        }
    }

    fn fix_descendants(&mut self) {
        for id in self.post_order() {
            if self.node(id).descendants.is_some() {
                continue;
            }
            let (count, below) = self.children(id).fold((0, 0), |(count, below), child| {
                (count + 1, below + self.node(child).descendants())
            });
            self.node_mut(id).descendants = Some(count + below);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(records: &[(&str, u64)], policy: DuplicatePolicy) -> DuTree {
        let mut builder = TreeBuilder::new(policy);
        for (path, size) in records {
            let segments: Vec<&str> = path.split('/').collect();
            builder.insert(&segments, *size);
        }
        builder.finish()
    }

    #[test]
    fn test_scenario_sizes_and_descendants() {
        let tree = build(
            &[("a/b", 100), ("a/c", 50), ("d", 200)],
            DuplicatePolicy::LastWins,
        );
        let root = tree.root();

        let names: Vec<&str> = tree.children(root).map(|c| tree.node(c).name()).collect();
        assert_eq!(names, vec!["a", "d"]);

        let a = tree.find(&["a"]).unwrap();
        let d = tree.find(&["d"]).unwrap();
        assert_eq!(tree.node(a).size(), 150);
        assert_eq!(tree.node(a).descendants(), 2);
        assert_eq!(tree.node(d).size(), 200);
        assert_eq!(tree.node(d).descendants(), 0);
        assert_eq!(tree.node(root).size(), 350);
        // a, d, and a's two children
        assert_eq!(tree.node(root).descendants(), 4);
    }

    #[test]
    fn test_empty_input() {
        let tree = TreeBuilder::default().finish();
        let root = tree.root();

        assert_eq!(tree.child_count(root), 0);
        assert_eq!(tree.node(root).size(), 0);
        assert_eq!(tree.node(root).descendants(), 0);
        assert_eq!(tree.node(root).expanded(), 0);
    }

    #[test]
    fn test_reported_directory_size_is_kept() {
        // du reports directories too; their own total wins over the children's sum
        let tree = build(
            &[("src/main.rs", 10), ("src/lib.rs", 20), ("src", 64)],
            DuplicatePolicy::LastWins,
        );
        let src = tree.find(&["src"]).unwrap();
        assert_eq!(tree.node(src).size(), 64);
        assert_eq!(tree.node(tree.root()).size(), 64);
    }

    #[test]
    fn test_children_of_reported_directory_are_fixed_too() {
        let tree = build(&[("a", 5), ("a/b/c", 3)], DuplicatePolicy::LastWins);
        let b = tree.find(&["a", "b"]).unwrap();
        assert_eq!(tree.node(b).size(), 3);
        assert_eq!(tree.node(tree.find(&["a"]).unwrap()).size(), 5);
    }

    #[test]
    fn test_duplicate_last_wins() {
        let tree = build(&[("x", 1), ("x", 2)], DuplicatePolicy::LastWins);
        assert_eq!(tree.node(tree.find(&["x"]).unwrap()).size(), 2);
        assert_eq!(tree.child_count(tree.root()), 1);
    }

    #[test]
    fn test_duplicate_keep_first() {
        let tree = build(&[("x", 1), ("x", 2)], DuplicatePolicy::KeepFirst);
        assert_eq!(tree.node(tree.find(&["x"]).unwrap()).size(), 1);
    }

    #[test]
    fn test_shared_prefixes_reuse_nodes() {
        let mut builder = TreeBuilder::default();
        let first = builder.insert(&["usr", "local", "bin"], 4);
        builder.insert(&["usr", "local", "lib"], 8);
        let again = builder.insert(&["usr", "local", "bin"], 4);
        assert_eq!(first, again);
        assert_eq!(builder.records(), 3);

        let tree = builder.finish();
        // root + usr + local + bin + lib
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.node(tree.root()).descendants(), 4);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let mut builder = TreeBuilder::default();
        builder.insert(&["", "usr", "", "bin"], 7);
        let tree = builder.finish();
        assert!(tree.find(&["usr", "bin"]).is_some());
        assert_eq!(tree.node(tree.root()).size(), 7);
    }

    #[test]
    fn test_record_without_segments_sizes_root() {
        let mut builder = TreeBuilder::default();
        builder.insert::<&str>(&[], 99);
        builder.insert(&["a"], 1);
        let tree = builder.finish();
        assert_eq!(tree.node(tree.root()).size(), 99);
    }

    #[test]
    fn test_grouped_leaves_sum_into_group_node() {
        let groups = vec![FileGroup::new("objects")
            .with_pattern("*.o")
            .with_pattern("*.a")];
        let mut builder = TreeBuilder::default().with_groups(groups);
        builder.insert(&["src", "main.c"], 8);
        builder.insert(&["src", "main.o"], 12);
        builder.insert(&["src", "libx.a"], 30);
        let tree = builder.finish();

        let src = tree.find(&["src"]).unwrap();
        let names: Vec<&str> = tree.children(src).map(|c| tree.node(c).name()).collect();
        assert_eq!(names, vec!["main.c", "objects"]);

        let objects = tree.find(&["src", "objects"]).unwrap();
        assert_eq!(tree.node(objects).size(), 42);
        assert_eq!(tree.node(objects).descendants(), 2);
        assert!(tree.find(&["src", "objects", "main.o"]).is_some());
        assert!(tree.find(&["src", "main.o"]).is_none());
        assert_eq!(tree.node(src).size(), 50);
    }

    #[test]
    fn test_only_last_segment_is_grouped() {
        let groups = vec![FileGroup::new("build").with_pattern("out*")];
        let mut builder = TreeBuilder::default().with_groups(groups);
        builder.insert(&["out", "x"], 1);
        builder.insert(&["out2"], 2);
        let tree = builder.finish();

        assert!(tree.find(&["out", "x"]).is_some());
        assert!(tree.find(&["build", "out2"]).is_some());
    }

    #[test]
    fn test_duplicate_grouped_leaf_is_counted_once() {
        let groups = vec![FileGroup::new("logs").with_pattern("*.log")];
        let mut builder = TreeBuilder::default().with_groups(groups);
        builder.insert(&["a.log"], 5);
        builder.insert(&["a.log"], 7);
        let tree = builder.finish();

        let logs = tree.find(&["logs"]).unwrap();
        assert_eq!(tree.node(logs).size(), 7);
        assert_eq!(tree.child_count(logs), 1);
    }

    #[test]
    fn test_origin_indices_form_permutation() {
        let tree = build(
            &[("z", 1), ("y", 2), ("x", 3), ("y/q", 1), ("w", 4)],
            DuplicatePolicy::LastWins,
        );
        let mut origins: Vec<usize> = tree
            .children(tree.root())
            .map(|c| tree.node(c).origin_index())
            .collect();
        origins.sort_unstable();
        assert_eq!(origins, vec![0, 1, 2, 3]);

        let last: Vec<bool> = tree
            .children(tree.root())
            .map(|c| tree.node(c).is_last_sibling())
            .collect();
        assert_eq!(last, vec![false, false, false, true]);
    }
}
