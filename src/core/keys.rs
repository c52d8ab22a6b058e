//! # Key Sequence Resolution
//!
//! Terminals report most control combinations as bare control characters:
//! Ctrl+C arrives as `0x03`, Backspace often as `0x7F`. The standard
//! resolver turns those back into a named key or a letter plus `Ctrl`.
//!
//! ```text
//! Character('\u{3}')          →  Character('C') + Ctrl
//! Character('\u{1b}')         →  Escape
//! Character('\u{7f}')         →  Backspace
//! anything else               →  unchanged
//! ```
//!
//! Modifiers already present on the event are kept.

use super::event::{Key, KeyEvent, Modifiers};

/// Applies the standard control-character resolution to one key event.
pub fn resolve_standard(event: KeyEvent) -> KeyEvent {
    let Key::Character(c) = event.key else {
        return event;
    };

    let (key, extra) = match c {
        '\u{1b}' => (Key::Escape, Modifiers::NONE),
        '\t' => (Key::Tab, Modifiers::NONE),
        '\r' | '\n' => (Key::Return, Modifiers::NONE),
        '\u{8}' | '\u{7f}' => (Key::Backspace, Modifiers::NONE),
        '\0' => (Key::Character(' '), Modifiers::CTRL),
        // 0x01..=0x1A map onto 'A'..='Z', 0x1C..=0x1F onto '\\' ']' '^' '_'
        '\u{1}'..='\u{1a}' | '\u{1c}'..='\u{1f}' => {
            (Key::Character(char::from(c as u8 + 0x40)), Modifiers::CTRL)
        }
        _ => return event,
    };

    KeyEvent::new(key, event.modifiers | extra)
}
