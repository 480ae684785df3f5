//! Reordering a node's children

use super::{DuTree, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Ordering applied to a node's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Order in which the report listed them
    #[default]
    Original,
    Size,
    /// Byte-wise name order
    Name,
    Descendants,
}

impl SortKey {
    /// Ascending comparison of two siblings
    pub fn compare(self, a: &Node, b: &Node) -> Ordering {
        match self {
            SortKey::Original => a.origin_index.cmp(&b.origin_index),
            SortKey::Size => a.size().cmp(&b.size()),
            SortKey::Name => a.name.as_bytes().cmp(b.name.as_bytes()),
            SortKey::Descendants => a.descendants().cmp(&b.descendants()),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SortKey::Original => "original order",
            SortKey::Size => "size",
            SortKey::Name => "name",
            SortKey::Descendants => "descendants",
        }
    }
}

impl DuTree {
    /// Sort the children of `id` by `key` (original order when `None`).
    ///
    /// The sort is stable in both directions: siblings that compare equal keep
    /// their current relative order, also when `reverse` is set. With
    /// `recursive`, every descendant's children get the same ordering.
    pub fn sort_children(
        &mut self,
        id: NodeId,
        key: Option<SortKey>,
        reverse: bool,
        recursive: bool,
    ) {
        let key = key.unwrap_or_default();
        debug!(node = %self.path_of(id), ?key, reverse, recursive, "sort children");
        self.sort_node(id, key, reverse, recursive);
    }

    fn sort_node(&mut self, id: NodeId, key: SortKey, reverse: bool, recursive: bool) {
        let mut children: Vec<NodeId> = self.children(id).collect();
        let Some(last) = children.len().checked_sub(1) else {
            return;
        };

        children.sort_by(|&a, &b| {
            let ordering = key.compare(self.node(a), self.node(b));
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        });

        for &child in &children {
            child.detach(self.arena_mut());
            id.append(child, self.arena_mut());
        }
        for (position, &child) in children.iter().enumerate() {
            self.node_mut(child).is_last_sibling = position == last;
        }

        if recursive {
            for child in children {
                self.sort_node(child, key, reverse, true);
            }
        }
    }
}
