//! Expand/collapse and the line number <-> node mapping
//!
//! Every visible node has a line number: the root is line 0 and each
//! following visible node takes the next one. Line numbers are never stored.
//! They are derived from each node's `expanded` counter, which holds how many
//! of its descendants are currently visible. A node therefore occupies
//! `1 + expanded` consecutive lines.
//!
//! ```text
//!  0        684 [root]
//!  1        684 `- usr
//!  2        684    `- local
//!  3        192       +- share ...
//!  4          4       +- bin ...
//!  5         96       `- stow ...
//! ```

use super::{DuTree, NodeId};
use tracing::debug;

/// How many levels below a node to reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandDepth {
    Levels(usize),
    All,
}

impl ExpandDepth {
    fn is_exhausted(self) -> bool {
        matches!(self, ExpandDepth::Levels(0))
    }

    fn descend(self) -> Self {
        match self {
            ExpandDepth::Levels(levels) => ExpandDepth::Levels(levels.saturating_sub(1)),
            ExpandDepth::All => ExpandDepth::All,
        }
    }
}

impl DuTree {
    /// Number of lines the whole tree occupies, the root line included
    pub fn visible_count(&self) -> usize {
        1 + self.node(self.root).expanded
    }

    /// True when every ancestor of `id` is expanded
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut node = id;
        while let Some(parent) = self.parent(node) {
            if self.node(parent).expanded == 0 {
                return false;
            }
            node = parent;
        }
        true
    }

    /// Reveal the children of `id` down to `depth` levels.
    ///
    /// Already visible descendants are left alone; returns the number of lines
    /// that became visible. `id` must itself be visible.
    pub fn expand(&mut self, id: NodeId, depth: ExpandDepth) -> usize {
        debug_assert!(self.is_visible(id), "expanding a hidden node");

        let shown = self.expand_subtree(id, depth);
        if shown > 0 {
            let mut ancestor = self.parent(id);
            while let Some(node) = ancestor {
                self.node_mut(node).expanded += shown;
                ancestor = self.parent(node);
            }
        }

        debug!(node = %self.path_of(id), ?depth, shown, "expand");
        shown
    }

    fn expand_subtree(&mut self, id: NodeId, depth: ExpandDepth) -> usize {
        let child_count = self.child_count(id);
        if child_count == 0 || depth.is_exhausted() {
            return 0;
        }

        let mut shown = 0;
        let node = self.node_mut(id);
        if node.expanded == 0 {
            node.expanded = child_count;
            shown += child_count;
        }

        let depth = depth.descend();
        if !depth.is_exhausted() {
            let mut child = self.first_child(id);
            while let Some(current) = child {
                let child_shown = self.expand_subtree(current, depth);
                shown += child_shown;
                self.node_mut(id).expanded += child_shown;
                child = self.next_sibling(current);
            }
        }

        shown
    }

    /// Hide every descendant of `id`; `id` itself stays visible.
    ///
    /// Returns the number of lines hidden.
    pub fn collapse(&mut self, id: NodeId) -> usize {
        let hidden = self.node(id).expanded;
        if hidden > 0 {
            let mut ancestor = self.parent(id);
            while let Some(node) = ancestor {
                self.node_mut(node).expanded -= hidden;
                ancestor = self.parent(node);
            }
            self.collapse_subtree(id);
        }

        debug!(node = %self.path_of(id), hidden, "collapse");
        hidden
    }

    fn collapse_subtree(&mut self, id: NodeId) {
        if self.node(id).expanded == 0 {
            return;
        }
        self.node_mut(id).expanded = 0;

        let mut child = self.first_child(id);
        while let Some(current) = child {
            self.collapse_subtree(current);
            child = self.next_sibling(current);
        }
    }

    /// The node shown on `line`, counting `root` as line 0
    pub fn node_at_line(&self, root: NodeId, line: usize) -> Option<NodeId> {
        if line > self.node(root).expanded {
            return None;
        }

        let mut node = root;
        let mut line = line;
        loop {
            if line == 0 {
                return Some(node);
            }
            line -= 1;

            let mut child = self.first_child(node);
            loop {
                let current = child?;
                let span = 1 + self.node(current).expanded;
                if line < span {
                    node = current;
                    break;
                }
                line -= span;
                child = self.next_sibling(current);
            }
        }
    }

    /// Line number of `id` relative to `root`, or to the top of the tree when
    /// `root` is `None`.
    ///
    /// Returns `None` when `root` is not an ancestor of `id`.
    pub fn line_of(&self, id: NodeId, root: Option<NodeId>) -> Option<usize> {
        let mut line = 0;
        let mut node = id;
        loop {
            if Some(node) == root {
                return Some(line);
            }
            let Some(parent) = self.parent(node) else {
                return match root {
                    None => Some(line),
                    Some(_) => None,
                };
            };

            line += 1;
            let mut sibling = self.previous_sibling(node);
            while let Some(current) = sibling {
                line += 1 + self.node(current).expanded;
                sibling = self.previous_sibling(current);
            }
            node = parent;
        }
    }

    /// The node on the line after `id`'s, if any
    pub fn next_visible(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).expanded > 0 {
            if let Some(child) = self.first_child(id) {
                return Some(child);
            }
        }

        let mut node = id;
        loop {
            if let Some(sibling) = self.next_sibling(node) {
                return Some(sibling);
            }
            node = self.parent(node)?;
        }
    }
}
