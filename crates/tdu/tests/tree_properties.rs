use proptest::prelude::*;
use tdu::render::RowFormat;
use tdu::tree::{DuTree, ExpandDepth, NodeId, SortKey, TreeBuilder};
use tdu::ui::Screen;
use tdu::viewport::{RedrawPolicy, Viewport};

const NAMES: &[&str] = &["a", "b", "c", "d"];

#[derive(Debug, Clone)]
enum Op {
    Expand(usize, Option<usize>),
    Collapse(usize),
    Sort(usize, SortKey, bool, bool),
    Move(usize),
}

fn records() -> impl Strategy<Value = Vec<(Vec<usize>, u64)>> {
    prop::collection::vec(
        (prop::collection::vec(0..NAMES.len(), 1..5), 0u64..1000),
        1..40,
    )
}

fn sort_key() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Original),
        Just(SortKey::Size),
        Just(SortKey::Name),
        Just(SortKey::Descendants),
    ]
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (any::<usize>(), prop::option::of(0usize..4)).prop_map(|(l, d)| Op::Expand(l, d)),
        any::<usize>().prop_map(Op::Collapse),
        (any::<usize>(), sort_key(), any::<bool>(), any::<bool>())
            .prop_map(|(l, k, rev, rec)| Op::Sort(l, k, rev, rec)),
        any::<usize>().prop_map(Op::Move),
    ];
    prop::collection::vec(op, 0..30)
}

fn build(records: &[(Vec<usize>, u64)]) -> DuTree {
    let mut builder = TreeBuilder::default();
    for (path, size) in records {
        let segments: Vec<&str> = path.iter().map(|&i| NAMES[i]).collect();
        builder.insert(&segments, *size);
    }
    builder.finish()
}

fn depth(levels: Option<usize>) -> ExpandDepth {
    levels.map_or(ExpandDepth::All, ExpandDepth::Levels)
}

/// Node on `line`, with `line` taken modulo the number of visible lines
fn visible_node(tree: &DuTree, line: usize) -> NodeId {
    let line = line % tree.visible_count();
    tree.node_at_line(tree.root(), line).unwrap()
}

fn apply(tree: &mut DuTree, op: &Op) {
    match *op {
        Op::Expand(line, levels) => {
            let node = visible_node(tree, line);
            tree.expand(node, depth(levels));
        }
        Op::Collapse(line) => {
            let node = visible_node(tree, line);
            tree.collapse(node);
        }
        Op::Sort(line, key, reverse, recursive) => {
            let node = visible_node(tree, line);
            tree.sort_children(node, Some(key), reverse, recursive);
        }
        Op::Move(_) => {}
    }
}

/// Checks the counters below `id`; returns its visible line span
fn check_counters(tree: &DuTree, id: NodeId, visible: bool) -> usize {
    let node = tree.node(id);
    if !visible {
        assert_eq!(node.expanded(), 0, "hidden node {} is expanded", tree.path_of(id));
    }

    let children: Vec<NodeId> = tree.children(id).collect();
    let descendants: usize = children
        .iter()
        .map(|&child| 1 + tree.node(child).descendants())
        .sum();
    assert_eq!(node.descendants(), descendants);

    let shown = visible && node.is_expanded();
    let spans: usize = children
        .iter()
        .map(|&child| 1 + check_counters(tree, child, shown))
        .sum();
    if node.is_expanded() {
        assert_eq!(node.expanded(), spans, "bad counter at {}", tree.path_of(id));
    }

    if let Some((&last, rest)) = children.split_last() {
        assert!(tree.node(last).is_last_sibling());
        assert!(rest.iter().all(|&child| !tree.node(child).is_last_sibling()));
    }
    node.expanded()
}

fn child_lists(tree: &DuTree, id: NodeId, out: &mut Vec<(NodeId, Vec<NodeId>)>) {
    let children: Vec<NodeId> = tree.children(id).collect();
    for &child in &children {
        child_lists(tree, child, out);
    }
    out.push((id, children));
}

proptest! {
    #[test]
    fn prop_counters_stay_consistent(records in records(), ops in ops()) {
        let mut tree = build(&records);
        for op in &ops {
            apply(&mut tree, op);
            let root = tree.root();
            check_counters(&tree, root, true);
        }
    }

    #[test]
    fn prop_lines_round_trip(records in records(), ops in ops()) {
        let mut tree = build(&records);
        for op in &ops {
            apply(&mut tree, op);
        }

        let root = tree.root();
        let count = tree.visible_count();
        for line in 0..count {
            let node = tree.node_at_line(root, line).unwrap();
            prop_assert_eq!(tree.line_of(node, None), Some(line));
            if line + 1 < count {
                prop_assert_eq!(tree.next_visible(node), tree.node_at_line(root, line + 1));
            } else {
                prop_assert_eq!(tree.next_visible(node), None);
            }
        }
        prop_assert_eq!(tree.node_at_line(root, count), None);
    }

    #[test]
    fn prop_expand_and_collapse_are_idempotent(
        records in records(),
        ops in ops(),
        line in any::<usize>(),
        levels in prop::option::of(0usize..4),
    ) {
        let mut tree = build(&records);
        for op in &ops {
            apply(&mut tree, op);
        }
        let node = visible_node(&tree, line);

        tree.expand(node, depth(levels));
        let count = tree.visible_count();
        prop_assert_eq!(tree.expand(node, depth(levels)), 0);
        prop_assert_eq!(tree.visible_count(), count);

        tree.collapse(node);
        let count = tree.visible_count();
        prop_assert_eq!(tree.collapse(node), 0);
        prop_assert_eq!(tree.visible_count(), count);
    }

    #[test]
    fn prop_collapse_undoes_expand(
        records in records(),
        ops in ops(),
        line in any::<usize>(),
        levels in prop::option::of(1usize..4),
    ) {
        let mut tree = build(&records);
        for op in &ops {
            apply(&mut tree, op);
        }
        let node = visible_node(&tree, line);
        tree.collapse(node);
        let before = tree.visible_count();

        let shown = tree.expand(node, depth(levels));
        prop_assert_eq!(tree.visible_count(), before + shown);
        prop_assert_eq!(tree.collapse(node), shown);
        prop_assert_eq!(tree.visible_count(), before);
    }

    #[test]
    fn prop_original_order_restores_children(
        records in records(),
        sorts in prop::collection::vec((sort_key(), any::<bool>()), 1..4),
    ) {
        let mut tree = build(&records);
        let root = tree.root();
        let mut before = Vec::new();
        child_lists(&tree, root, &mut before);

        for (key, reverse) in sorts {
            tree.sort_children(root, Some(key), reverse, true);
        }
        tree.sort_children(root, None, false, true);

        let mut after = Vec::new();
        child_lists(&tree, root, &mut after);
        prop_assert_eq!(after, before);
    }

    #[test]
    fn prop_incremental_redraw_matches_full(
        records in records(),
        ops in ops(),
        rows in 1usize..8,
    ) {
        let format = RowFormat { ascii: true, ..RowFormat::default() };
        let mut trees = [build(&records), build(&records)];
        let mut views = [
            Viewport::new(rows, RedrawPolicy::Incremental),
            Viewport::new(rows, RedrawPolicy::Full),
        ];
        let mut screens = [Screen::new(40, rows as u16), Screen::new(40, rows as u16)];
        for i in 0..2 {
            views[i].refresh(&trees[i], &format, &mut screens[i]);
        }

        for op in &ops {
            for i in 0..2 {
                let (tree, view, screen) = (&mut trees[i], &mut views[i], &mut screens[i]);
                let cursor = tree.node_at_line(tree.root(), view.cursor_line());
                match *op {
                    Op::Move(line) => {
                        view.move_to(line % (tree.visible_count() + 2));
                        view.refresh(tree, &format, screen);
                    }
                    Op::Expand(_, levels) => {
                        let node = cursor.unwrap();
                        let shown = tree.expand(node, depth(levels));
                        view.after_toggle(shown as isize, tree, &format, screen);
                    }
                    Op::Collapse(_) => {
                        let node = cursor.unwrap();
                        let hidden = tree.collapse(node);
                        view.after_toggle(-(hidden as isize), tree, &format, screen);
                    }
                    Op::Sort(_, key, reverse, recursive) => {
                        let node = cursor.unwrap();
                        tree.sort_children(node, Some(key), reverse, recursive);
                        view.after_sort(tree, &format, screen);
                    }
                }
            }
            prop_assert_eq!(screens[0].rows(), screens[1].rows(), "after {:?}", op);
            prop_assert_eq!(screens[0].cursor_row(), screens[1].cursor_row());
        }
    }
}
