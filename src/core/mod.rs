//! # Core
//!
//! Backend-neutral pieces: the event model, key resolution, and
//! configuration. Nothing here touches the terminal.
//!
//! ## Modules
//!
//! - [`event`]: `TerminalEvent` and friends, with their echo text
//! - [`keys`]: control-character resolution
//! - [`config`]: config file loading and override resolution

pub mod config;
pub mod event;
pub mod keys;
