//! # Event Loop
//!
//! Owns one bordered sub-window and echoes every terminal event into it
//! until Ctrl+C is pressed or input runs out.
//!
//! ```text
//! Initializing ──start()──▶ Running ──Ctrl+C / input closed──▶ Terminated
//!                              │  ▲
//!                              └──┘ any other event
//! ```

use std::io;

use log::{debug, info};
use ratatui::layout::Rect;

use crate::core::event::{Size, TerminalEvent};

use super::{Terminal, WindowId};

/// Cells taken from each dimension by the screen border.
pub const BORDER_MARGIN: u16 = 2;

/// Pressed together with `Ctrl`, ends the loop.
pub const QUIT_KEY: char = 'C';

pub const FOOTER_HINT: &str = "Press Ctrl+C to quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Running,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    QuitKey,
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The sub-window inside the screen border.
pub fn sub_window_area(screen: Size) -> Rect {
    let size = inner_size(screen);
    Rect::new(1, 1, size.width, size.height)
}

/// Sub-window size for a screen of `screen` cells.
pub fn inner_size(screen: Size) -> Size {
    Size::new(
        screen.width.saturating_sub(BORDER_MARGIN),
        screen.height.saturating_sub(BORDER_MARGIN),
    )
}

pub fn is_quit_event(event: &TerminalEvent) -> bool {
    matches!(event, TerminalEvent::Key(key) if key.is_ctrl_char(QUIT_KEY))
}

pub fn identification(terminal: &Terminal) -> String {
    format!("Using {} on {}", terminal.backend_version(), terminal.name())
}

pub struct EventLoop<'t> {
    terminal: &'t mut Terminal,
    window: WindowId,
    state: SessionState,
}

impl<'t> EventLoop<'t> {
    /// Lays out the sub-window and paints the first frame.
    pub fn start(terminal: &'t mut Terminal) -> io::Result<Self> {
        let mut event_loop = Self {
            window: terminal.create_window(sub_window_area(terminal.size())),
            terminal,
            state: SessionState::Initializing,
        };
        event_loop.initial_paint()?;
        event_loop.state = SessionState::Running;
        info!(
            "Event loop running, sub-window at {:?}",
            event_loop.terminal.window(event_loop.window).area()
        );
        Ok(event_loop)
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn terminal(&self) -> &Terminal {
        self.terminal
    }

    /// Processes events until the quit key or the end of input.
    pub fn run(&mut self) -> io::Result<ExitReason> {
        let reason = loop {
            let Some(event) = self.terminal.next_event(self.window)? else {
                break ExitReason::InputClosed;
            };
            if self.handle(&event)? == Flow::Quit {
                break ExitReason::QuitKey;
            }
        };

        self.state = SessionState::Terminated;
        info!("Event loop finished: {:?}", reason);
        Ok(reason)
    }

    fn initial_paint(&mut self) -> io::Result<()> {
        let screen = self.terminal.screen();
        let window = self.window;
        let footer = self.terminal.footer();

        self.terminal.draw_border(screen);
        if let Some(footer) = footer {
            self.terminal.write_text(footer, FOOTER_HINT);
        }

        let mut batch = self.terminal.atomic_refresh();
        batch.refresh(screen)?;
        batch.refresh(window)?;
        if let Some(footer) = footer {
            batch.refresh(footer)?;
        }
        batch.commit()?;

        let line = identification(&*self.terminal);
        self.terminal.write_text(window, &format!("{line}\n"));
        Ok(())
    }

    fn handle(&mut self, event: &TerminalEvent) -> io::Result<Flow> {
        debug!("Event: {}", event);
        self.terminal.write_text(self.window, &format!("{event}\n"));

        if let TerminalEvent::Resize(size) = event {
            self.redraw_after_resize(*size)?;
        }

        if is_quit_event(event) {
            return Ok(Flow::Quit);
        }
        Ok(Flow::Continue)
    }

    fn redraw_after_resize(&mut self, size: Size) -> io::Result<()> {
        let screen = self.terminal.screen();
        let window = self.window;
        let footer = self.terminal.footer();

        self.terminal.resize_window(window, inner_size(size));
        self.terminal.draw_border(screen);
        info!("Resized to {}, sub-window now {}", size, self.terminal.window(window).size());

        let mut batch = self.terminal.atomic_refresh();
        batch.mark_dirty(screen);
        batch.refresh(screen)?;
        batch.mark_dirty(window);
        batch.refresh(window)?;
        if let Some(footer) = footer {
            batch.mark_dirty(footer);
            batch.refresh(footer)?;
        }
        batch.commit()
    }
}
