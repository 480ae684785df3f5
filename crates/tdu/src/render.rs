//! Text of a single tree row: size column, branch glyphs and name

use crate::tree::{DuTree, ExpandDepth, NodeId};
use std::io::{self, Write};

/// Glyphs drawn in front of a node's name, one per level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeGlyphs {
    /// This node is the last of its siblings
    pub last: &'static str,
    pub not_last: &'static str,
    /// An ancestor that is the last of its siblings
    pub parent_last: &'static str,
    pub parent_not_last: &'static str,
}

pub const ASCII_GLYPHS: TreeGlyphs = TreeGlyphs {
    last: "`- ",
    not_last: "+- ",
    parent_last: "   ",
    parent_not_last: "|  ",
};

pub const UNICODE_GLYPHS: TreeGlyphs = TreeGlyphs {
    last: "└─ ",
    not_last: "├─ ",
    parent_last: "   ",
    parent_not_last: "│  ",
};

/// Marker appended to collapsed nodes that have children
pub const COLLAPSED_MARKER: &str = " ...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowFormat {
    pub ascii: bool,
    pub show_descendants: bool,
    pub human_sizes: bool,
}

impl RowFormat {
    pub fn glyphs(&self) -> TreeGlyphs {
        if self.ascii {
            ASCII_GLYPHS
        } else {
            UNICODE_GLYPHS
        }
    }

    /// Render the row for `id`
    pub fn format(&self, tree: &DuTree, id: NodeId) -> String {
        let node = tree.node(id);
        let mut row = String::new();

        if self.human_sizes {
            row.push_str(&format!("{:>10} ", format_size(node.size())));
        } else {
            row.push_str(&format!("{:>12} ", node.size()));
        }
        if self.show_descendants {
            row.push_str(&format!("{:>8} ", node.descendants()));
        }

        row.push_str(&self.branches(tree, id));
        row.extend(node.name().chars().map(|c| if c.is_control() { '?' } else { c }));

        if !node.is_expanded() && tree.has_children(id) {
            row.push_str(COLLAPSED_MARKER);
        }
        row
    }

    fn branches(&self, tree: &DuTree, id: NodeId) -> String {
        let glyphs = self.glyphs();
        let mut levels = Vec::new();

        let mut node = id;
        while let Some(parent) = tree.parent(node) {
            let last = tree.node(node).is_last_sibling();
            let glyph = match (node == id, last) {
                (true, true) => glyphs.last,
                (true, false) => glyphs.not_last,
                (false, true) => glyphs.parent_last,
                (false, false) => glyphs.parent_not_last,
            };
            levels.push(glyph);
            node = parent;
        }

        levels.iter().rev().copied().collect()
    }
}

/// Expand the whole tree and write every row to `out`
pub fn dump<W: Write>(tree: &mut DuTree, format: &RowFormat, out: &mut W) -> io::Result<()> {
    let root = tree.root();
    tree.expand(root, ExpandDepth::All);

    let mut node = Some(root);
    while let Some(id) = node {
        writeln!(out, "{}", format.format(tree, id))?;
        node = tree.next_visible(id);
    }
    out.flush()
}

/// Human-readable size for `kib`, a count of 1024-byte blocks as `du -k` reports
pub fn format_size(kib: u64) -> String {
    const MB: u64 = 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if kib >= TB {
        format!("{:.2} TB", kib as f64 / TB as f64)
    } else if kib >= GB {
        format!("{:.2} GB", kib as f64 / GB as f64)
    } else if kib >= MB {
        format!("{:.2} MB", kib as f64 / MB as f64)
    } else {
        format!("{} KB", kib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn usr_local_tree() -> DuTree {
        let mut builder = TreeBuilder::default();
        builder.insert(&["usr", "local", "share", "man"], 48);
        builder.insert(&["usr", "local", "share", "emacs"], 24);
        builder.insert(&["usr", "local", "bin", "tdu"], 4);
        builder.insert(&["usr", "local", "games"], 4);
        builder.finish()
    }

    fn ascii() -> RowFormat {
        RowFormat {
            ascii: true,
            ..RowFormat::default()
        }
    }

    #[test]
    fn test_rows_match_classic_layout() {
        let mut tree = usr_local_tree();
        let root = tree.root();
        tree.expand(root, ExpandDepth::Levels(3));
        let share = tree.find(&["usr", "local", "share"]).unwrap();
        tree.expand(share, ExpandDepth::Levels(1));

        let rows: Vec<String> = (0..tree.visible_count())
            .map(|line| ascii().format(&tree, tree.node_at_line(root, line).unwrap()))
            .collect();

        assert_eq!(
            rows,
            vec![
                "          80 [root]",
                "          80 `- usr",
                "          80    `- local",
                "          72       +- share",
                "          48       |  +- man",
                "          24       |  `- emacs",
                "           4       +- bin ...",
                "           4       `- games",
            ]
        );
    }

    #[test]
    fn test_unicode_glyphs() {
        let mut tree = usr_local_tree();
        let root = tree.root();
        tree.expand(root, ExpandDepth::Levels(3));
        let bin = tree.find(&["usr", "local", "bin"]).unwrap();

        let row = RowFormat::default().format(&tree, bin);
        assert_eq!(row, "           4       ├─ bin ...");
    }

    #[test]
    fn test_descendants_column_and_human_sizes() {
        let mut builder = TreeBuilder::default();
        builder.insert(&["big", "file"], 3 * 1024);
        let mut tree = builder.finish();
        tree.expand(tree.root(), ExpandDepth::Levels(1));
        let big = tree.find(&["big"]).unwrap();

        let format = RowFormat {
            ascii: true,
            show_descendants: true,
            human_sizes: true,
        };
        assert_eq!(format.format(&tree, big), "   3.00 MB        1 `- big ...");
    }

    #[test]
    fn test_human_sizes_read_report_kilobytes() {
        let report = crate::report::read_report(
            std::io::Cursor::new("2048\tbig\n".as_bytes()),
            &crate::settings::InputSettings::default(),
        )
        .unwrap();
        let big = report.tree.find(&["big"]).unwrap();

        let format = RowFormat {
            ascii: true,
            human_sizes: true,
            ..RowFormat::default()
        };
        assert_eq!(format.format(&report.tree, big), "   2.00 MB `- big");
    }

    #[test]
    fn test_control_characters_are_replaced() {
        let mut builder = TreeBuilder::default();
        builder.insert(&["bad\x1b[2Jname"], 1);
        let mut tree = builder.finish();
        tree.expand(tree.root(), ExpandDepth::All);
        let node = tree.children(tree.root()).next().unwrap();

        let row = ascii().format(&tree, node);
        assert!(row.ends_with("`- bad?[2Jname"));
    }

    #[test]
    fn test_dump_lists_every_node() {
        let mut tree = usr_local_tree();
        let mut out = Vec::new();
        dump(&mut tree, &ascii(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), tree.node_count());
        assert!(text.lines().all(|line| !line.ends_with(COLLAPSED_MARKER)));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 KB");
        assert_eq!(format_size(512), "512 KB");
        assert_eq!(format_size(2048), "2.00 MB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 GB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 TB");
    }
}
