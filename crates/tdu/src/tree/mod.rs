//! Arena-backed directory tree built from a disk usage report
//!
//! Nodes live in an [`indextree::Arena`] and refer to each other by
//! [`NodeId`], so the parent link is a plain index rather than a borrow.
//! Construction happens once through [`TreeBuilder`]; afterwards only the
//! per-node visibility counters and the order of children change.

mod builder;
mod group;
mod sort;
mod visibility;

pub use builder::{DuplicatePolicy, TreeBuilder};
pub use group::{matching_group, pattern_matches, FileGroup};
pub use indextree::NodeId;
pub use sort::SortKey;
pub use visibility::ExpandDepth;

use indextree::Arena;

/// Name given to the synthetic node that holds every top-level path
pub const ROOT_NAME: &str = "[root]";

/// One path segment of the report: a file, a directory, or the root
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    /// Aggregate size; `None` until reported or computed from the children
    pub(crate) size: Option<u64>,
    /// Number of currently visible descendants (0 when collapsed)
    pub(crate) expanded: usize,
    /// Total number of descendants; `None` until the tree is finished
    pub(crate) descendants: Option<usize>,
    /// Position among the siblings at insertion time
    pub(crate) origin_index: usize,
    pub(crate) is_last_sibling: bool,
}

impl Node {
    fn new(name: &str, origin_index: usize) -> Self {
        Self {
            name: name.to_string(),
            size: None,
            expanded: 0,
            descendants: None,
            origin_index,
            is_last_sibling: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aggregate size of this node and everything below it
    pub fn size(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded > 0
    }

    pub fn descendants(&self) -> usize {
        self.descendants.unwrap_or(0)
    }

    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    pub fn is_last_sibling(&self) -> bool {
        self.is_last_sibling
    }
}

/// The whole report as a tree, rooted at a node named [`ROOT_NAME`]
#[derive(Debug, Clone)]
pub struct DuTree {
    arena: Arena<Node>,
    root: NodeId,
}

impl DuTree {
    pub(crate) fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Node::new(ROOT_NAME, 0));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena[id].get()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.arena[id].get_mut()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// Children of `id` in their current display order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.arena[id].first_child().is_some()
    }

    pub(crate) fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].first_child()
    }

    pub(crate) fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].next_sibling()
    }

    pub(crate) fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].previous_sibling()
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.arena.count()
    }

    /// Distance from the root (the root itself is at depth 0)
    pub fn depth(&self, id: NodeId) -> usize {
        id.ancestors(&self.arena).count() - 1
    }

    /// Follow `segments` down from the root by name
    pub fn find<S: AsRef<str>>(&self, segments: &[S]) -> Option<NodeId> {
        let mut node = self.root;
        for segment in segments {
            let segment = segment.as_ref();
            node = self
                .children(node)
                .find(|&child| self.node(child).name == segment)?;
        }
        Some(node)
    }

    /// Slash-joined path of `id` below the root, or [`ROOT_NAME`] for the root
    pub fn path_of(&self, id: NodeId) -> String {
        if id == self.root {
            return ROOT_NAME.to_string();
        }

        let mut names: Vec<&str> = id
            .ancestors(&self.arena)
            .take_while(|&ancestor| ancestor != self.root)
            .map(|ancestor| self.node(ancestor).name.as_str())
            .collect();
        names.reverse();

        let mut path = String::new();
        for name in names {
            if !path.is_empty() && !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(name);
        }
        path
    }

    /// Append a fresh child named `name` after the current last child of `parent`
    pub(crate) fn append_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let origin_index = match self.arena[parent].last_child() {
            Some(last) => {
                let last = self.node_mut(last);
                last.is_last_sibling = false;
                last.origin_index + 1
            }
            None => 0,
        };
        let child = self.arena.new_node(Node::new(name, origin_index));
        parent.append(child, &mut self.arena);
        child
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena<Node> {
        &mut self.arena
    }
}
