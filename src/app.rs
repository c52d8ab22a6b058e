//! # Startup
//!
//! ```text
//! probe tool ──fail──▶ print "not found" + error text, stop
//!     │ ok
//!     ▼
//! load backend ──fail──▶ print "no compatible backend", stop
//!     │ ok
//!     ▼
//! event loop until Ctrl+C or input closes
//! ```
//!
//! Messages go to `out`, which is stdout in the binary. The terminal is
//! released when `launch` returns.

use std::io::{self, Write};

use log::{info, warn};

use crate::core::config::ResolvedConfig;
use crate::probe;
use crate::tui::event_loop::{EventLoop, ExitReason};
use crate::tui::{Backend, BackendError, Terminal};

pub const NO_BACKEND_MESSAGE: &str = "Sorry, no compatible Curses backend found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ProbeFailed,
    NoBackend,
    Finished(ExitReason),
}

pub fn not_found_message(program: &str) -> String {
    format!("{program} command was not found on PATH.")
}

/// Runs the probe, then the event loop on whatever `load_backend` returns.
pub async fn launch<L, W>(
    config: &ResolvedConfig,
    load_backend: L,
    out: &mut W,
) -> io::Result<Outcome>
where
    L: FnOnce() -> Result<Box<dyn Backend>, BackendError>,
    W: Write,
{
    let report = probe::check_tool(&config.probe).await;
    if !report.success {
        writeln!(out, "{}", not_found_message(&config.probe.program))?;
        writeln!(out, "Error: {}", report.error_output.trim_end())?;
        return Ok(Outcome::ProbeFailed);
    }

    let backend = match load_backend() {
        Ok(backend) => backend,
        Err(e) => {
            warn!("Backend initialisation failed: {}", e);
            writeln!(out, "{NO_BACKEND_MESSAGE}")?;
            return Ok(Outcome::NoBackend);
        }
    };

    let mut terminal = match Terminal::new(backend, config.terminal) {
        Ok(terminal) => terminal,
        Err(e) => {
            warn!("Terminal setup failed: {}", e);
            writeln!(out, "{NO_BACKEND_MESSAGE}")?;
            return Ok(Outcome::NoBackend);
        }
    };

    let reason = EventLoop::start(&mut terminal)?.run()?;
    info!("Session ended: {:?}", reason);
    Ok(Outcome::Finished(reason))
}
