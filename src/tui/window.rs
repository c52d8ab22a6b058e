use std::collections::VecDeque;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::core::event::Size;

/// Logical lines kept per window before the oldest are dropped.
pub const MAX_SCROLLBACK: usize = 1000;

/// A rectangular viewport on the screen.
///
/// Text written to a window scrolls like a console: the newest rows are at
/// the bottom, older ones scroll off the top. Nothing reaches the terminal
/// until the window is refreshed through its [`Terminal`](super::Terminal).
#[derive(Debug)]
pub struct Window {
    area: Rect,
    // The last entry is the line the caret is on.
    lines: VecDeque<String>,
    bordered: bool,
    dirty: bool,
}

impl Window {
    pub(crate) fn new(area: Rect) -> Self {
        Self {
            area,
            lines: VecDeque::from([String::new()]),
            bordered: false,
            dirty: true,
        }
    }

    /// Absolute position and size on the terminal.
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn size(&self) -> Size {
        Size::new(self.area.width, self.area.height)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Logical lines written so far, oldest first. The last one is the
    /// (possibly empty) line still being written.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Appends text at the caret. `\n` starts a new line.
    pub fn write_text(&mut self, text: &str) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            if let Some(current) = self.lines.back_mut() {
                current.push_str(first);
            }
        }
        for part in parts {
            self.lines.push_back(part.to_string());
        }
        while self.lines.len() > MAX_SCROLLBACK {
            self.lines.pop_front();
        }
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn set_bordered(&mut self) {
        self.bordered = true;
        self.dirty = true;
    }

    pub(crate) fn set_area(&mut self, area: Rect) {
        if self.area != area {
            self.area = area;
            self.dirty = true;
        }
    }

    /// Paints the window over its area of `buf`, replacing whatever was there.
    pub(crate) fn render(&self, buf: &mut Buffer) {
        let area = self.area.intersection(buf.area);
        if area.is_empty() {
            return;
        }
        Clear.render(area, buf);

        let inner = if self.bordered {
            let block = Block::bordered();
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };
        if inner.is_empty() {
            return;
        }

        let rows: Vec<Line> = self
            .visible_rows(inner.width, inner.height)
            .into_iter()
            .map(Line::from)
            .collect();
        Paragraph::new(rows).render(inner, buf);
    }

    /// The last `height` rows after wrapping every line to `width`.
    fn visible_rows(&self, width: u16, height: u16) -> Vec<String> {
        let height = usize::from(height);
        let mut rows = Vec::with_capacity(height);

        'lines: for line in self.lines.iter().rev() {
            let wrapped: Vec<String> = if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, usize::from(width))
                    .into_iter()
                    .map(|row| row.into_owned())
                    .collect()
            };
            for row in wrapped.into_iter().rev() {
                if rows.len() == height {
                    break 'lines;
                }
                rows.push(row);
            }
        }

        rows.reverse();
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn test_write_text_splits_lines() {
        let mut window = Window::new(Rect::new(0, 0, 20, 5));
        window.write_text("first\nsec");
        window.write_text("ond\n");
        let lines: Vec<&str> = window.lines().collect();
        assert_eq!(lines, vec!["first", "second", ""]);
        assert!(window.is_dirty());
    }

    #[test]
    fn test_scrollback_is_capped() {
        let mut window = Window::new(Rect::new(0, 0, 20, 5));
        for i in 0..MAX_SCROLLBACK + 10 {
            window.write_text(&format!("line {i}\n"));
        }
        assert_eq!(window.lines().count(), MAX_SCROLLBACK);
        assert_eq!(window.lines().next(), Some("line 11"));
    }

    #[test]
    fn test_visible_rows_show_newest_text() {
        let mut window = Window::new(Rect::new(0, 0, 10, 2));
        window.write_text("one\ntwo\nthree");
        assert_eq!(window.visible_rows(10, 2), vec!["two", "three"]);
    }

    #[test]
    fn test_long_lines_wrap_to_width() {
        let mut window = Window::new(Rect::new(0, 0, 5, 3));
        window.write_text("aaa bbb ccc");
        assert_eq!(window.visible_rows(5, 3), vec!["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_render_bordered_window() {
        let mut window = Window::new(Rect::new(0, 0, 8, 3));
        window.set_bordered();
        window.write_text("hi");
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 3));
        window.render(&mut buf);
        assert_eq!(row_text(&buf, 0), "┌──────┐");
        assert_eq!(row_text(&buf, 1), "│hi    │");
        assert_eq!(row_text(&buf, 2), "└──────┘");
    }

    #[test]
    fn test_render_clips_to_buffer() {
        let mut window = Window::new(Rect::new(2, 0, 10, 1));
        window.write_text("abcdefghij");
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        window.render(&mut buf);
        assert_eq!(row_text(&buf, 0), "  ij  ");
    }

    #[test]
    fn test_set_area_only_dirties_on_change() {
        let mut window = Window::new(Rect::new(1, 1, 4, 4));
        window.clear_dirty();
        window.set_area(Rect::new(1, 1, 4, 4));
        assert!(!window.is_dirty());
        window.set_area(Rect::new(1, 1, 6, 4));
        assert!(window.is_dirty());
        assert_eq!(window.size(), Size::new(6, 4));
    }
}
