//! Persistent off-screen copy of the tree area
//!
//! The viewport draws into this buffer through [`Surface`]; every frame copies
//! it into the ratatui frame, and ratatui then only sends the cells that
//! changed to the terminal.

use crate::viewport::Surface;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

pub struct Screen {
    buffer: Buffer,
    cursor_row: Option<usize>,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, width, height)),
            cursor_row: None,
        }
    }

    /// Reallocate for a new terminal size; the contents are discarded
    pub fn resize(&mut self, width: u16, height: u16) {
        self.buffer = Buffer::empty(Rect::new(0, 0, width, height));
        self.cursor_row = None;
    }

    pub fn height(&self) -> usize {
        self.buffer.area.height as usize
    }

    pub fn cursor_row(&self) -> Option<usize> {
        self.cursor_row
    }

    /// Text of `row` without trailing blanks
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.height() {
            return String::new();
        }
        let width = self.buffer.area.width;
        let text: String = (0..width)
            .map(|x| self.buffer[(x, row as u16)].symbol())
            .collect();
        text.trim_end().to_string()
    }

    pub fn rows(&self) -> Vec<String> {
        (0..self.height()).map(|row| self.row_text(row)).collect()
    }

    fn clear_rows(&mut self, from: usize, to: usize) {
        let width = self.buffer.area.width as usize;
        for cell in &mut self.buffer.content[from * width..to * width] {
            cell.reset();
        }
    }
}

impl Surface for Screen {
    fn width(&self) -> usize {
        self.buffer.area.width as usize
    }

    fn put_str(&mut self, row: usize, col: usize, width: usize, text: &str) {
        let screen_width = self.width();
        if row >= self.height() || col >= screen_width {
            return;
        }
        let max_width = width.min(screen_width - col);
        self.buffer
            .set_stringn(col as u16, row as u16, text, max_width, Style::default());
    }

    fn clear_row(&mut self, row: usize) {
        if row < self.height() {
            self.clear_rows(row, row + 1);
        }
    }

    fn scroll(&mut self, top: usize, bottom: usize, delta: isize) {
        let bottom = bottom.min(self.height());
        if top >= bottom || delta == 0 {
            return;
        }

        let shift = delta.unsigned_abs();
        if shift >= bottom - top {
            self.clear_rows(top, bottom);
            return;
        }

        let width = self.width();
        let band = &mut self.buffer.content[top * width..bottom * width];
        if delta > 0 {
            band.rotate_left(shift * width);
            self.clear_rows(bottom - shift, bottom);
        } else {
            band.rotate_right(shift * width);
            self.clear_rows(top, top + shift);
        }
    }

    fn set_cursor(&mut self, row: usize) {
        self.cursor_row = Some(row);
    }
}

impl Widget for &Screen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.min(self.buffer.area.width);
        let height = area.height.min(self.buffer.area.height);

        for y in 0..height {
            for x in 0..width {
                buf[(area.x + x, area.y + y)] = self.buffer[(x, y)].clone();
            }
        }

        if let Some(row) = self.cursor_row {
            if row < height as usize {
                let line = Rect::new(area.x, area.y + row as u16, width, 1);
                buf.set_style(line, Style::default().add_modifier(Modifier::REVERSED));
            }
        }
    }
}
