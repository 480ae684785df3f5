//! Help and about overlays

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Width of the key column in the help text
const KEY_COLUMN: usize = 16;

const KEYS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation:",
        &[
            ("↑ k K ^P", "Move up one line"),
            ("↓ j J ^N", "Move down one line"),
            ("PgUp PgDn", "Move one page"),
            ("S-PgUp S-PgDn", "Move ten lines"),
            ("Home/<", "Jump to the first line"),
            ("End/>", "Jump to the last line"),
            ("p/P", "Jump to the parent directory"),
            ("Ctrl-L", "Center the current line"),
        ],
    ),
    (
        "Tree:",
        &[
            ("→ 1 l L ^F", "Expand one level (repeat to go deeper)"),
            ("2-9", "Expand that many levels"),
            ("*", "Expand everything below"),
            ("← 0 h H ^B", "Collapse"),
        ],
    ),
    (
        "Sorting (uppercase: descending, prefix = : recursive):",
        &[
            ("s/S", "Sort by size"),
            ("n/N", "Sort by name"),
            ("d/D", "Sort by number of descendants"),
            ("u/U", "Restore the report's order"),
        ],
    ),
    (
        "Display:",
        &[
            ("A", "Toggle ASCII / line drawing characters"),
            ("#", "Toggle the descendants column"),
            ("Ctrl-R", "Redraw the screen"),
        ],
    ),
    (
        "General:",
        &[
            ("?", "Show this help"),
            ("C", "Version and license"),
            ("q Q x X Esc ^C", "Quit"),
        ],
    ),
];

pub fn render_help(f: &mut Frame, area: Rect) {
    let mut text = vec![
        Line::from(vec![Span::styled(
            "tdu - Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ];

    for (section, keys) in KEYS {
        text.push(Line::from(vec![Span::styled(
            *section,
            Style::default().fg(Color::Yellow),
        )]));
        for (key, action) in *keys {
            text.push(Line::from(format!("  {:<width$}{}", key, action, width = KEY_COLUMN)));
        }
        text.push(Line::from(""));
    }
    text.push(close_hint());

    let height = text.len() as u16 + 2;
    render_popup(f, area, text, "Help (?)", 64, height);
}

pub fn render_about(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            format!("tdu {}", env!("CARGO_PKG_VERSION")),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(env!("CARGO_PKG_DESCRIPTION")),
        Line::from(format!("License: {}", env!("CARGO_PKG_LICENSE"))),
        Line::from(env!("CARGO_PKG_REPOSITORY")),
        Line::from(""),
        Line::from("Reads the output of `du -ak` from a file or stdin."),
        Line::from(""),
        close_hint(),
    ];

    render_popup(f, area, text, "About (C)", 56, 11);
}

fn close_hint() -> Line<'static> {
    Line::from(vec![Span::styled(
        "Press any key to close",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    )])
}

fn render_popup(f: &mut Frame, area: Rect, text: Vec<Line>, title: &str, width: u16, height: u16) {
    let popup = centered_rect(width, height, area);
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
