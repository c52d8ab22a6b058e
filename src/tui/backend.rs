//! # Backends
//!
//! A backend is the concrete terminal driver underneath [`Terminal`](super::Terminal):
//! it reports the terminal size, blocks for input, and puts composed frames
//! on the physical screen. Everything above it works on frames and
//! backend-neutral events only.
//!
//! [`load`] walks the known candidates in order and returns the first one
//! that initialises on this host.

use std::fmt;
use std::io;

use log::{info, warn};
use ratatui::buffer::Buffer;

use crate::core::event::{Size, TerminalEvent};

use super::crossterm_backend;

pub trait Backend {
    /// Name of the terminal the backend is attached to, e.g. `$TERM`.
    fn terminal_name(&self) -> String;

    /// Identifies the library doing the terminal I/O.
    fn version(&self) -> String;

    /// Full terminal size in cells.
    fn size(&self) -> io::Result<Size>;

    /// Blocks until the next event arrives. `Ok(None)` means the input
    /// side of the terminal is gone and no more events will come.
    fn read_event(&mut self) -> io::Result<Option<TerminalEvent>>;

    /// Makes `frame` visible as a single update.
    fn present(&mut self, frame: &Buffer) -> io::Result<()>;
}

#[derive(Debug)]
pub enum BackendError {
    /// Stdin or stdout is not attached to a terminal.
    NotATerminal,
    /// `TERM=dumb` or similar: no cursor addressing available.
    DumbTerminal,
    Init(io::Error),
    /// Every candidate failed.
    NoCompatibleBackend,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotATerminal => write!(f, "standard input/output is not a terminal"),
            BackendError::DumbTerminal => write!(f, "terminal does not support cursor addressing"),
            BackendError::Init(e) => write!(f, "backend initialisation failed: {e}"),
            BackendError::NoCompatibleBackend => write!(f, "no compatible terminal backend found"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Init(e) => Some(e),
            _ => None,
        }
    }
}

type Loader = fn() -> Result<Box<dyn Backend>, BackendError>;

const CANDIDATES: &[(&str, Loader)] = &[("crossterm", crossterm_backend::load)];

/// Loads the first backend that works on this host.
pub fn load() -> Result<Box<dyn Backend>, BackendError> {
    load_from(CANDIDATES)
}

fn load_from(candidates: &[(&str, Loader)]) -> Result<Box<dyn Backend>, BackendError> {
    for (name, loader) in candidates {
        match loader() {
            Ok(backend) => {
                info!("Loaded {} backend ({})", name, backend.version());
                return Ok(backend);
            }
            Err(e) => warn!("Backend {} unavailable: {}", name, e),
        }
    }
    Err(BackendError::NoCompatibleBackend)
}
