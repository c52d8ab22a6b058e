//! # TUI Adapter
//!
//! A small curses-style layer over a [`Backend`]: a screen, optional footer
//! row, and any number of sub-windows, all owned by one [`Terminal`].
//!
//! ## Refresh Model
//!
//! Drawing into a window only changes the window. [`Terminal::refresh`]
//! copies a dirty window into the virtual screen and, outside an atomic
//! refresh, presents the virtual screen right away. Later refreshes paint
//! over earlier ones, so a parent is refreshed before its children.
//!
//! ```text
//! write_text / draw_border / resize_window   →  window dirty
//! refresh(window)                            →  staged into virtual screen
//! (no atomic scope open)                     →  backend.present(frame)
//! ```
//!
//! [`Terminal::atomic_refresh`] opens a scope in which refreshes are only
//! staged; the frame is presented once when the outermost scope ends.

pub mod backend;
mod crossterm_backend;
pub mod event_loop;
pub mod window;

use std::io;
use std::ops::{Deref, DerefMut};

use log::{debug, info, warn};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::core::event::{Size, TerminalEvent};
use crate::core::keys;

pub use backend::{Backend, BackendError};
pub use window::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Turn raw control characters into named keys and `Ctrl` combinations.
    pub use_standard_key_sequence_resolvers: bool,
    /// Reserve the bottom row as a footer window.
    pub allocate_footer: bool,
    /// When false, reading events from a window refreshes it first.
    pub manual_flush: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            use_standard_key_sequence_resolvers: true,
            allocate_footer: false,
            manual_flush: false,
        }
    }
}

/// Handle to a window owned by a [`Terminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(usize);

const SCREEN: WindowId = WindowId(0);

pub struct Terminal {
    backend: Box<dyn Backend>,
    options: TerminalOptions,
    windows: Vec<Window>,
    footer: Option<WindowId>,
    staged: Buffer,
    pending: bool,
    batch_depth: usize,
}

impl Terminal {
    pub fn new(backend: Box<dyn Backend>, options: TerminalOptions) -> io::Result<Self> {
        let size = backend.size()?;
        let full = Rect::new(0, 0, size.width, size.height);
        let (screen_area, footer_area) = split_footer(full, options.allocate_footer);

        let mut windows = vec![Window::new(screen_area)];
        let footer = if options.allocate_footer {
            windows.push(Window::new(footer_area));
            Some(WindowId(1))
        } else {
            None
        };

        info!("Terminal {} opened at {} ({:?})", backend.terminal_name(), size, options);
        Ok(Self {
            backend,
            options,
            windows,
            footer,
            staged: Buffer::empty(full),
            pending: false,
            batch_depth: 0,
        })
    }

    pub fn name(&self) -> String {
        self.backend.terminal_name()
    }

    pub fn backend_version(&self) -> String {
        self.backend.version()
    }

    pub fn screen(&self) -> WindowId {
        SCREEN
    }

    pub fn footer(&self) -> Option<WindowId> {
        self.footer
    }

    /// Size of the screen window (the terminal minus any footer row).
    pub fn size(&self) -> Size {
        self.windows[SCREEN.0].size()
    }

    pub fn window(&self, id: WindowId) -> &Window {
        &self.windows[id.0]
    }

    /// Creates a sub-window; `area` is clipped to the screen.
    pub fn create_window(&mut self, area: Rect) -> WindowId {
        let area = area.intersection(self.windows[SCREEN.0].area());
        self.windows.push(Window::new(area));
        WindowId(self.windows.len() - 1)
    }

    /// Changes a window's size, keeping its origin. The result is clipped
    /// to the screen.
    pub fn resize_window(&mut self, id: WindowId, size: Size) {
        let screen = self.windows[SCREEN.0].area();
        let window = &mut self.windows[id.0];
        let requested = Rect {
            width: size.width,
            height: size.height,
            ..window.area()
        };
        window.set_area(requested.intersection(screen));
    }

    pub fn write_text(&mut self, id: WindowId, text: &str) {
        self.windows[id.0].write_text(text);
    }

    pub fn mark_dirty(&mut self, id: WindowId) {
        self.windows[id.0].mark_dirty();
    }

    pub fn draw_border(&mut self, id: WindowId) {
        self.windows[id.0].set_bordered();
    }

    /// Stages the window if it changed, then presents unless an atomic
    /// refresh is open.
    pub fn refresh(&mut self, id: WindowId) -> io::Result<()> {
        let window = &mut self.windows[id.0];
        if window.is_dirty() {
            window.render(&mut self.staged);
            window.clear_dirty();
            self.pending = true;
        }
        if self.batch_depth == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Opens an atomic refresh scope. See [`AtomicRefresh`].
    pub fn atomic_refresh(&mut self) -> AtomicRefresh<'_> {
        self.batch_depth += 1;
        AtomicRefresh {
            terminal: self,
            finished: false,
        }
    }

    /// Blocks for the next event, with `id` as the listening window.
    ///
    /// Returns `Ok(None)` once the terminal has no more input.
    pub fn next_event(&mut self, id: WindowId) -> io::Result<Option<TerminalEvent>> {
        if !self.options.manual_flush {
            self.refresh(id)?;
        }

        let Some(event) = self.backend.read_event()? else {
            return Ok(None);
        };
        let event = match event {
            TerminalEvent::Key(key) if self.options.use_standard_key_sequence_resolvers => {
                TerminalEvent::Key(keys::resolve_standard(key))
            }
            TerminalEvent::Resize(size) => TerminalEvent::Resize(self.apply_resize(size)),
            other => other,
        };
        Ok(Some(event))
    }

    /// Lays the windows out for a new terminal size and returns the new
    /// screen size.
    fn apply_resize(&mut self, size: Size) -> Size {
        let full = Rect::new(0, 0, size.width, size.height);
        let (screen_area, footer_area) = split_footer(full, self.options.allocate_footer);

        self.staged = Buffer::empty(full);
        self.pending = false;

        for (index, window) in self.windows.iter_mut().enumerate() {
            let area = match WindowId(index) {
                SCREEN => screen_area,
                id if Some(id) == self.footer => footer_area,
                _ => window.area().intersection(screen_area),
            };
            window.set_area(area);
        }

        debug!("Screen resized to {}x{}", screen_area.width, screen_area.height);
        Size::new(screen_area.width, screen_area.height)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending {
            self.backend.present(&self.staged)?;
            self.pending = false;
        }
        Ok(())
    }

    fn end_batch(&mut self) -> io::Result<()> {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            self.flush()?;
        }
        Ok(())
    }
}

/// An open atomic refresh. Dereferences to the [`Terminal`].
///
/// Refreshes made through it are staged and presented together when the
/// outermost scope is committed or dropped. Errors on drop are logged; call
/// [`AtomicRefresh::commit`] to observe them.
pub struct AtomicRefresh<'a> {
    terminal: &'a mut Terminal,
    finished: bool,
}

impl AtomicRefresh<'_> {
    pub fn commit(mut self) -> io::Result<()> {
        self.finished = true;
        self.terminal.end_batch()
    }
}

impl Deref for AtomicRefresh<'_> {
    type Target = Terminal;

    fn deref(&self) -> &Terminal {
        self.terminal
    }
}

impl DerefMut for AtomicRefresh<'_> {
    fn deref_mut(&mut self) -> &mut Terminal {
        self.terminal
    }
}

impl Drop for AtomicRefresh<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.terminal.end_batch() {
                warn!("Atomic refresh failed to present: {}", e);
            }
        }
    }
}

/// Splits off the bottom row when a footer is requested.
fn split_footer(full: Rect, allocate_footer: bool) -> (Rect, Rect) {
    if allocate_footer && full.height > 0 {
        let screen = Rect {
            height: full.height - 1,
            ..full
        };
        let footer = Rect {
            y: full.bottom() - 1,
            height: 1,
            ..full
        };
        (screen, footer)
    } else {
        (full, Rect { height: 0, ..full })
    }
}
