//! Mapping a window of tree lines onto display rows
//!
//! The viewport remembers which line was at the top of the display the last
//! time it drew, so that moving the window only scrolls the surface and
//! repaints the rows that scrolled in. Expand, collapse and sort at the cursor
//! likewise repaint only the rows whose content changed.

use crate::render::RowFormat;
use crate::tree::{DuTree, NodeId};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Something rows of text can be drawn on
pub trait Surface {
    /// Width in columns
    fn width(&self) -> usize;

    /// Write `text` starting at (`row`, `col`), never past `col + width`
    fn put_str(&mut self, row: usize, col: usize, width: usize, text: &str);

    fn clear_row(&mut self, row: usize);

    /// Move the contents of rows `top..bottom` by `delta` rows. A positive
    /// delta moves content up, a negative one moves it down; rows scrolled in
    /// are blank.
    fn scroll(&mut self, top: usize, bottom: usize, delta: isize);

    /// Place the terminal cursor on `row`
    fn set_cursor(&mut self, row: usize);
}

/// How much of the viewport to repaint after expanding or collapsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedrawPolicy {
    /// Scroll the rows below the cursor and repaint only what changed
    #[default]
    Incremental,
    /// Repaint the cursor row and everything below it
    Full,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    visible_lines: usize,
    start_line: usize,
    cursor_line: usize,
    /// `start_line` as of the last draw; `None` when nothing is on screen
    prev_start_line: Option<usize>,
    policy: RedrawPolicy,
}

impl Viewport {
    pub fn new(visible_lines: usize, policy: RedrawPolicy) -> Self {
        Self {
            visible_lines,
            start_line: 0,
            cursor_line: 0,
            prev_start_line: None,
            policy,
        }
    }

    pub fn visible_lines(&self) -> usize {
        self.visible_lines
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    pub fn policy(&self) -> RedrawPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: RedrawPolicy) {
        self.policy = policy;
    }

    /// Row of the display the cursor is on
    pub fn cursor_row(&self) -> usize {
        self.cursor_line.saturating_sub(self.start_line)
    }

    /// Forget what is on screen; the next refresh repaints everything
    pub fn invalidate(&mut self) {
        self.prev_start_line = None;
    }

    /// New display height; always followed by a full repaint
    pub fn resize(&mut self, visible_lines: usize) {
        self.visible_lines = visible_lines;
        self.invalidate();
    }

    pub fn move_up(&mut self, lines: usize) {
        self.cursor_line = self.cursor_line.saturating_sub(lines);
    }

    /// Move the cursor down; clamped to the last line by the next refresh
    pub fn move_down(&mut self, lines: usize) {
        self.cursor_line = self.cursor_line.saturating_add(lines);
    }

    pub fn move_to(&mut self, line: usize) {
        self.cursor_line = line;
    }

    pub fn page_up(&mut self) {
        self.move_up(self.page_size());
    }

    pub fn page_down(&mut self) {
        self.move_down(self.page_size());
    }

    pub fn home(&mut self) {
        self.move_to(0);
    }

    pub fn end(&mut self) {
        self.move_to(usize::MAX);
    }

    /// Scroll so the cursor line sits in the middle of the display
    pub fn recenter(&mut self) {
        self.start_line = self.cursor_line.saturating_sub(self.visible_lines / 2);
    }

    fn page_size(&self) -> usize {
        self.visible_lines.saturating_sub(1).max(1)
    }

    /// Bring the display in line with the cursor and the tree.
    ///
    /// Clamps the cursor, scrolls just far enough to keep it on screen, and
    /// then either repaints every row (first draw, or a jump of a screenful or
    /// more) or scrolls the surface and repaints the rows that came into view.
    pub fn refresh<S: Surface + ?Sized>(
        &mut self,
        tree: &DuTree,
        format: &RowFormat,
        surface: &mut S,
    ) {
        let last_line = tree.visible_count() - 1;
        self.cursor_line = self.cursor_line.min(last_line);

        if self.visible_lines == 0 {
            self.invalidate();
            return;
        }

        if self.cursor_line < self.start_line {
            self.start_line = self.cursor_line;
        } else if self.cursor_line >= self.start_line + self.visible_lines {
            self.start_line = self.cursor_line + 1 - self.visible_lines;
        }
        self.start_line = self.start_line.min(last_line);

        match self.prev_start_line {
            Some(prev) if prev.abs_diff(self.start_line) < self.visible_lines => {
                let delta = self.start_line as isize - prev as isize;
                let shift = delta.unsigned_abs();
                if delta > 0 {
                    trace!(delta, "scroll viewport");
                    surface.scroll(0, self.visible_lines, delta);
                    self.draw_rows(self.visible_lines - shift, self.visible_lines, tree, format, surface);
                } else if delta < 0 {
                    trace!(delta, "scroll viewport");
                    surface.scroll(0, self.visible_lines, delta);
                    self.draw_rows(0, shift, tree, format, surface);
                }
            }
            _ => {
                trace!(start_line = self.start_line, "full redraw");
                self.draw_rows(0, self.visible_lines, tree, format, surface);
            }
        }

        self.prev_start_line = Some(self.start_line);
        surface.set_cursor(self.cursor_line - self.start_line);
    }

    /// Repaint after the node at the cursor was expanded or collapsed.
    ///
    /// `delta` is the number of lines the operation made visible (positive)
    /// or hid (negative). Lines after the cursor node's subtree keep their
    /// content and only move, so unless the policy asks for a full repaint or
    /// the move is at least as tall as the area below the cursor, those rows
    /// are scrolled instead of redrawn.
    pub fn after_toggle<S: Surface + ?Sized>(
        &mut self,
        delta: isize,
        tree: &DuTree,
        format: &RowFormat,
        surface: &mut S,
    ) {
        if delta == 0 {
            return;
        }
        let Some(cursor_node) = self.drawn_cursor_node(tree) else {
            self.invalidate();
            self.refresh(tree, format, surface);
            return;
        };

        let row = self.cursor_line - self.start_line;
        let below = row + 1;
        let band = self.visible_lines - below;
        let shift = delta.unsigned_abs();

        if self.policy == RedrawPolicy::Full || shift >= band {
            self.draw_rows(row, self.visible_lines, tree, format, surface);
        } else {
            // The cursor row may gain or lose its collapsed marker
            self.draw_rows(row, below, tree, format, surface);

            // Rows past the subtree move by -delta; scroll() counts upward
            surface.scroll(below, self.visible_lines, -delta);

            let span = tree.node(cursor_node).expanded();
            let span_end = (below + span).min(self.visible_lines);
            self.draw_rows(below, span_end, tree, format, surface);
            if delta < 0 {
                let revealed = (self.visible_lines - shift).max(span_end);
                self.draw_rows(revealed, self.visible_lines, tree, format, surface);
            }
        }

        self.refresh(tree, format, surface);
    }

    /// Repaint after the children of the node at the cursor were reordered
    pub fn after_sort<S: Surface + ?Sized>(
        &mut self,
        tree: &DuTree,
        format: &RowFormat,
        surface: &mut S,
    ) {
        let Some(cursor_node) = self.drawn_cursor_node(tree) else {
            self.invalidate();
            self.refresh(tree, format, surface);
            return;
        };

        let below = self.cursor_line - self.start_line + 1;
        let span_end = (below + tree.node(cursor_node).expanded()).min(self.visible_lines);
        self.draw_rows(below, span_end, tree, format, surface);
        self.refresh(tree, format, surface);
    }

    /// Cursor node, provided the screen is current and shows the cursor
    fn drawn_cursor_node(&self, tree: &DuTree) -> Option<NodeId> {
        if self.prev_start_line != Some(self.start_line)
            || self.cursor_line < self.start_line
            || self.cursor_line >= self.start_line + self.visible_lines
        {
            return None;
        }
        let node = tree.node_at_line(tree.root(), self.cursor_line);
        debug_assert!(node.is_some(), "cursor line {} out of range", self.cursor_line);
        node
    }

    /// Paint display rows `from..to`; rows past the last tree line are cleared
    fn draw_rows<S: Surface + ?Sized>(
        &self,
        from: usize,
        to: usize,
        tree: &DuTree,
        format: &RowFormat,
        surface: &mut S,
    ) {
        if from >= to {
            return;
        }

        let width = surface.width();
        let mut node = tree.node_at_line(tree.root(), self.start_line + from);
        for row in from..to {
            surface.clear_row(row);
            if let Some(id) = node {
                surface.put_str(row, 0, width, &format.format(tree, id));
                node = tree.next_visible(id);
            }
        }
    }
}
