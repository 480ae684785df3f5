mod help;
mod screen;
mod types;

pub use screen::Screen;
pub use types::{SortState, View};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io;
use tracing::{debug, info};

use crate::render::RowFormat;
use crate::settings::UiSettings;
use crate::tree::{DuTree, ExpandDepth, NodeId, SortKey};
use crate::viewport::Viewport;
use types::sort_key_for;

/// Rows taken by the status bar
const STATUS_ROWS: u16 = 1;

/// Lines moved by Shift+PageUp and Shift+PageDown
const SHIFTED_PAGE_LINES: usize = 10;

pub struct App {
    tree: DuTree,
    viewport: Viewport,
    screen: Screen,
    format: RowFormat,
    view: View,
    sort: SortState,
    /// Node last expanded with Right/1 or a digit and the depth used, so
    /// that pressing Right again reveals one more level
    last_expand: Option<(NodeId, usize)>,
    /// `=` was pressed; the next sort applies to the whole subtree
    recursive_prefix: bool,
    skipped_lines: usize,
    status_message: String,
    should_quit: bool,
}

impl App {
    /// Set up the initial view of `tree` for a terminal of `width` x `height`
    pub fn new(mut tree: DuTree, ui: &UiSettings, skipped_lines: usize, width: u16, height: u16) -> Self {
        let root = tree.root();
        let mut sort = SortState {
            key: ui.initial_sort,
            descending: ui.initial_sort_descending,
            recursive: false,
        };
        if sort.key != SortKey::Original || sort.descending {
            tree.sort_children(root, Some(sort.key), sort.descending, true);
            sort.recursive = true;
        }
        tree.expand(root, ExpandDepth::Levels(ui.initial_expand_depth));

        // A lone top-level entry (usually `.`) is opened too and gets the cursor
        let lone_child = if tree.node(root).is_expanded() && tree.child_count(root) == 1 {
            tree.children(root).next()
        } else {
            None
        };
        let mut start_line = 0;
        if let Some(only) = lone_child {
            tree.expand(only, ExpandDepth::Levels(ui.initial_expand_depth));
            start_line = 1;
        }

        let rows = height.saturating_sub(STATUS_ROWS);
        let status_message = if skipped_lines > 0 {
            format!("{} malformed lines skipped", skipped_lines)
        } else {
            String::new()
        };

        let mut app = Self {
            tree,
            viewport: Viewport::new(rows as usize, ui.redraw),
            screen: Screen::new(width, rows),
            format: ui.row_format(),
            view: View::Tree,
            sort,
            last_expand: None,
            recursive_prefix: false,
            skipped_lines,
            status_message,
            should_quit: false,
        };
        app.viewport.move_to(start_line);
        app.refresh();
        app
    }

    pub fn tree(&self) -> &DuTree {
        &self.tree
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Node under the cursor
    pub fn cursor_node(&self) -> NodeId {
        let root = self.tree.root();
        self.tree
            .node_at_line(root, self.viewport.cursor_line())
            .unwrap_or(root)
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        self.handle_resize(size.width, size.height);

        let result = self.run_event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn run_event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Resize(width, height) => self.handle_resize(width, height),
                _ => {}
            }

            if self.should_quit {
                info!("quit");
                return Ok(());
            }
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        let rows = height.saturating_sub(STATUS_ROWS);
        debug!(width, rows, "resize");
        self.screen.resize(width, rows);
        self.viewport.resize(rows as usize);
        self.refresh();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.view != View::Tree {
            self.view = View::Tree;
            return;
        }

        let last_expand = self.last_expand.take();
        let recursive = std::mem::take(&mut self.recursive_prefix);
        if recursive || key.code != KeyCode::Char('=') {
            self.status_message.clear();
        }

        if ctrl {
            match key.code {
                KeyCode::Char('l') => self.viewport.recenter(),
                KeyCode::Char('r') => self.viewport.invalidate(),
                KeyCode::Char('p') => self.viewport.move_up(1),
                KeyCode::Char('n') => self.viewport.move_down(1),
                KeyCode::Char('f') => self.expand_one_more(last_expand),
                KeyCode::Char('b') => self.collapse_at_cursor(),
                _ => {}
            }
            self.refresh();
            return;
        }
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('q' | 'Q' | 'x' | 'X') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.view = View::Help,
            KeyCode::Char('C') => self.view = View::About,

            KeyCode::Up | KeyCode::Char('k' | 'K') => self.viewport.move_up(1),
            KeyCode::Down | KeyCode::Char('j' | 'J') => self.viewport.move_down(1),
            KeyCode::PageUp if shift => self.viewport.move_up(SHIFTED_PAGE_LINES),
            KeyCode::PageDown if shift => self.viewport.move_down(SHIFTED_PAGE_LINES),
            KeyCode::PageUp => self.viewport.page_up(),
            KeyCode::PageDown => self.viewport.page_down(),
            KeyCode::Home | KeyCode::Char('<') => self.viewport.home(),
            KeyCode::End | KeyCode::Char('>') => self.viewport.end(),
            KeyCode::Char('p' | 'P') => self.go_to_parent(),

            KeyCode::Left | KeyCode::Char('0' | 'h' | 'H') => self.collapse_at_cursor(),
            KeyCode::Right | KeyCode::Char('1' | 'l' | 'L') => self.expand_one_more(last_expand),
            KeyCode::Char(c @ '2'..='9') => {
                let node = self.cursor_node();
                let levels = c.to_digit(10).map_or(1, |d| d as usize);
                self.expand_at_cursor(ExpandDepth::Levels(levels));
                self.last_expand = Some((node, levels));
            }
            KeyCode::Char('*') => self.expand_at_cursor(ExpandDepth::All),

            KeyCode::Char('=') => {
                self.recursive_prefix = true;
                self.status_message = "recursive sort: s/S n/N d/D u/U".to_string();
            }
            KeyCode::Char('A') => {
                self.format.ascii = !self.format.ascii;
                self.viewport.invalidate();
            }
            KeyCode::Char('#') => {
                self.format.show_descendants = !self.format.show_descendants;
                self.viewport.invalidate();
            }
            KeyCode::Char(c) => {
                if let Some(sort_key) = sort_key_for(c) {
                    self.sort_at_cursor(sort_key, c.is_ascii_uppercase(), recursive);
                }
            }
            _ => {}
        }

        self.refresh();
    }

    fn refresh(&mut self) {
        self.viewport.refresh(&self.tree, &self.format, &mut self.screen);
    }

    fn go_to_parent(&mut self) {
        let node = self.cursor_node();
        if let Some(line) = self
            .tree
            .parent(node)
            .and_then(|parent| self.tree.line_of(parent, None))
        {
            self.viewport.move_to(line);
        }
    }

    fn expand_at_cursor(&mut self, depth: ExpandDepth) {
        let node = self.cursor_node();
        let shown = self.tree.expand(node, depth);
        self.viewport
            .after_toggle(shown as isize, &self.tree, &self.format, &mut self.screen);
    }

    /// Expand one level deeper than last time when the previous key expanded
    /// this same node, otherwise one level
    fn expand_one_more(&mut self, last_expand: Option<(NodeId, usize)>) {
        let node = self.cursor_node();
        let levels = match last_expand {
            Some((previous, levels)) if previous == node => levels + 1,
            _ => 1,
        };
        self.expand_at_cursor(ExpandDepth::Levels(levels));
        self.last_expand = Some((node, levels));
    }

    fn collapse_at_cursor(&mut self) {
        let node = self.cursor_node();
        let hidden = self.tree.collapse(node);
        self.viewport
            .after_toggle(-(hidden as isize), &self.tree, &self.format, &mut self.screen);
    }

    fn sort_at_cursor(&mut self, key: SortKey, descending: bool, recursive: bool) {
        let node = self.cursor_node();
        self.tree.sort_children(node, Some(key), descending, recursive);
        self.sort = SortState {
            key,
            descending,
            recursive,
        };
        self.viewport
            .after_sort(&self.tree, &self.format, &mut self.screen);
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(STATUS_ROWS)])
            .split(f.area());

        f.render_widget(&self.screen, chunks[0]);

        match self.view {
            View::Tree => {
                if let Some(row) = self.screen.cursor_row() {
                    if row < chunks[0].height as usize {
                        f.set_cursor_position((chunks[0].x, chunks[0].y + row as u16));
                    }
                }
            }
            View::Help => help::render_help(f, chunks[0]),
            View::About => help::render_about(f, chunks[0]),
        }

        self.render_status_bar(f, chunks[1]);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let help_text = match self.view {
            View::Tree => "?: help | q: quit",
            View::Help | View::About => "Press any key to close",
        };

        let node = self.cursor_node();
        let mut spans = vec![
            Span::raw(self.tree.path_of(node)),
            Span::raw(" | "),
            Span::raw(self.sort.describe()),
        ];
        if self.skipped_lines > 0 && self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("{} skipped", self.skipped_lines),
                Style::default().fg(Color::Red),
            ));
        }
        if !self.status_message.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.status_message.as_str(),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(help_text, Style::default().fg(Color::Gray)));

        f.render_widget(Paragraph::new(vec![Line::from(spans)]), area);
    }
}
