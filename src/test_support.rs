//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use ratatui::buffer::Buffer;

use crate::core::event::{Size, TerminalEvent};
use crate::tui::Backend;

/// Every frame a [`ScriptedBackend`] was asked to present, in order.
pub type FrameLog = Rc<RefCell<Vec<Buffer>>>;

/// A backend that replays a fixed list of events and records frames.
///
/// Input is closed once the script runs out. Resize events also change the
/// size the backend reports, like a real terminal would.
pub struct ScriptedBackend {
    size: Size,
    events: Rc<RefCell<VecDeque<TerminalEvent>>>,
    frames: FrameLog,
    size_fails: bool,
}

impl ScriptedBackend {
    pub fn new(size: Size, events: Vec<TerminalEvent>) -> (Self, FrameLog) {
        let frames = FrameLog::default();
        let backend = Self {
            size,
            events: Rc::new(RefCell::new(events.into())),
            frames: Rc::clone(&frames),
            size_fails: false,
        };
        (backend, frames)
    }

    /// Makes every size query fail, as when the terminal goes away between
    /// loading the backend and building the screen.
    pub fn with_failing_size(mut self) -> Self {
        self.size_fails = true;
        self
    }

    /// Shared view of the events not read yet.
    pub fn remaining(&self) -> Rc<RefCell<VecDeque<TerminalEvent>>> {
        Rc::clone(&self.events)
    }
}

impl Backend for ScriptedBackend {
    fn terminal_name(&self) -> String {
        "test-term".to_string()
    }

    fn version(&self) -> String {
        "scripted 1.0".to_string()
    }

    fn size(&self) -> io::Result<Size> {
        if self.size_fails {
            return Err(io::Error::other("terminal size unavailable"));
        }
        Ok(self.size)
    }

    fn read_event(&mut self) -> io::Result<Option<TerminalEvent>> {
        let event = self.events.borrow_mut().pop_front();
        if let Some(TerminalEvent::Resize(size)) = event {
            self.size = size;
        }
        Ok(event)
    }

    fn present(&mut self, frame: &Buffer) -> io::Result<()> {
        self.frames.borrow_mut().push(frame.clone());
        Ok(())
    }
}

/// One row of a frame as plain text.
pub fn row_text(buf: &Buffer, y: u16) -> String {
    (buf.area.left()..buf.area.right())
        .map(|x| buf[(x, y)].symbol())
        .collect()
}
