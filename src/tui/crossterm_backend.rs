//! Crossterm backend, driven through ratatui's default terminal.
//!
//! Key presses are reported the way a curses terminal would see them:
//! Ctrl+letter arrives as the bare control character (`Ctrl+C` is `0x03`)
//! and only becomes `Character('C') + Ctrl` once key resolution runs.
//! Crossterm has already decoded the combination; undoing that here keeps
//! `use_standard_key_sequence_resolvers` meaningful, the way curses
//! `keypad` decides whether control bytes reach the program raw.

use std::io::{self, IsTerminal};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::{debug, info};
use ratatui::DefaultTerminal;
use ratatui::buffer::Buffer;

use crate::core::event::{Key, KeyEvent, Modifiers, Size, TerminalEvent};

use super::backend::{Backend, BackendError};

/// Reported as the backend version. Only the library is named; the
/// resolved crossterm release is whatever Cargo.lock pins.
const LIBRARY: &str = "crossterm";

pub struct CrosstermBackend {
    terminal: DefaultTerminal,
    name: String,
}

pub fn load() -> Result<Box<dyn Backend>, BackendError> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(BackendError::NotATerminal);
    }
    let name = std::env::var("TERM").unwrap_or_default();
    if name == "dumb" {
        return Err(BackendError::DumbTerminal);
    }

    let terminal = init_or_restore(ratatui::try_init, ratatui::restore)?;
    info!("Terminal initialised (raw mode, alternate screen)");

    Ok(Box::new(CrosstermBackend {
        terminal,
        name: if name.is_empty() { "console".to_string() } else { name },
    }))
}

/// Runs `init`; if it fails after touching the terminal, `restore` puts the
/// tty back in cooked mode before the error is reported.
fn init_or_restore<T>(
    init: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce(),
) -> Result<T, BackendError> {
    init().map_err(|e| {
        restore();
        BackendError::Init(e)
    })
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

impl Backend for CrosstermBackend {
    fn terminal_name(&self) -> String {
        self.name.clone()
    }

    fn version(&self) -> String {
        LIBRARY.to_string()
    }

    fn size(&self) -> io::Result<Size> {
        let size = self.terminal.size()?;
        Ok(Size::new(size.width, size.height))
    }

    fn read_event(&mut self) -> io::Result<Option<TerminalEvent>> {
        loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(e) if is_closed(&e) => {
                    info!("Terminal input closed: {}", e);
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            match event {
                Event::Key(key) => {
                    if let Some(key) = translate_key(key) {
                        return Ok(Some(TerminalEvent::Key(key)));
                    }
                }
                Event::Resize(width, height) => {
                    return Ok(Some(TerminalEvent::Resize(Size::new(width, height))));
                }
                other => debug!("Ignoring event: {:?}", other),
            }
        }
    }

    fn present(&mut self, frame: &Buffer) -> io::Result<()> {
        self.terminal.draw(|f| {
            let area = f.area().intersection(frame.area);
            let target = f.buffer_mut();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    target[(x, y)] = frame[(x, y)].clone();
                }
            }
        })?;
        Ok(())
    }
}

fn is_closed(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset
    )
}

/// Converts a crossterm key press. Releases and keys with no counterpart
/// (media keys, bare modifiers) are dropped.
pub(crate) fn translate_key(key: event::KeyEvent) -> Option<KeyEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let mut modifiers = translate_modifiers(key.modifiers);
    let key = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            match control_character(c) {
                Some(raw) => {
                    modifiers = modifiers.without(Modifiers::CTRL);
                    Key::Character(raw)
                }
                None => Key::Character(c),
            }
        }
        KeyCode::Char(c) => Key::Character(c),
        KeyCode::Enter => Key::Return,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Esc => Key::Escape,
        KeyCode::F(n) => Key::Function(n),
        _ => return None,
    };

    Some(KeyEvent::new(key, modifiers))
}

fn translate_modifiers(modifiers: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if modifiers.contains(KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if modifiers.contains(KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    out
}

/// The byte a terminal sends for Ctrl + `c`, if there is one.
fn control_character(c: char) -> Option<char> {
    match c {
        'a'..='z' | 'A'..='Z' => Some(char::from(c.to_ascii_uppercase() as u8 - 0x40)),
        ' ' | '@' => Some('\0'),
        '\\' | ']' | '^' | '_' => Some(char::from(c as u8 - 0x40)),
        _ => None,
    }
}
