//! Keyboard key definitions and synthetic typing sequences.
//!
//! Pages that gate their submit control on key listeners are not satisfied by
//! a programmatic value assignment alone. [`input_events`] expands a string
//! into the event sequence a US-English keyboard would produce, which a
//! [`PageElement`](super::PageElement) then dispatches one event at a time.
//!
//! # Example
//!
//! ```ignore
//! use form_pilot::page::keyboard::{input_events, KeyEventKind};
//!
//! let events = input_events("A1");
//! // Shift down, keydown A, keypress A, input A, keyup A, Shift up,
//! // keydown 1, keypress 1, input 1, keyup 1
//! assert_eq!(events.len(), 10);
//! assert_eq!(events[0].kind, KeyEventKind::KeyDown);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Key Enum
// ============================================================================

/// Named keys that do not map to a single printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // ========================================================================
    // Control
    // ========================================================================
    /// Enter/Return key
    Enter,
    /// Tab key
    Tab,
    /// Escape key
    Escape,
    /// Backspace key
    Backspace,
    /// Space bar
    Space,
    /// Left Shift modifier
    Shift,
}

impl Key {
    /// Returns the key properties: (key, code, keyCode, printable).
    #[must_use]
    pub fn properties(self) -> (&'static str, &'static str, u32, bool) {
        match self {
            Key::Enter => ("Enter", "Enter", 13, false),
            Key::Tab => ("Tab", "Tab", 9, false),
            Key::Escape => ("Escape", "Escape", 27, false),
            Key::Backspace => ("Backspace", "Backspace", 8, false),
            Key::Space => (" ", "Space", 32, true),
            Key::Shift => ("Shift", "ShiftLeft", 16, false),
        }
    }

    /// Returns the stroke produced by pressing this key alone.
    #[must_use]
    pub fn stroke(self) -> KeyStroke {
        let (key, code, key_code, printable) = self.properties();
        KeyStroke {
            key: key.to_string(),
            code: code.to_string(),
            key_code,
            printable,
            shift: false,
        }
    }
}

// ============================================================================
// KeyStroke
// ============================================================================

/// A single physical key press, with the modifier state needed to produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStroke {
    /// `KeyboardEvent.key` value (e.g. `"a"`, `"A"`, `"Enter"`).
    pub key: String,
    /// `KeyboardEvent.code` value (e.g. `"KeyA"`, `"Digit1"`).
    pub code: String,
    /// Legacy `keyCode`.
    pub key_code: u32,
    /// Whether the key produces visible output.
    pub printable: bool,
    /// Whether Shift must be held.
    pub shift: bool,
}

impl KeyStroke {
    fn printable(key: char, code: impl Into<String>, key_code: u32, shift: bool) -> Self {
        Self {
            key: key.to_string(),
            code: code.into(),
            key_code,
            printable: true,
            shift,
        }
    }

    /// Maps a character to the stroke a US-English layout needs to type it.
    ///
    /// Characters outside the layout are typed as printable keys with an
    /// empty code and key code 0.
    #[must_use]
    pub fn for_char(c: char) -> Self {
        match c {
            'a'..='z' => {
                let upper = c.to_ascii_uppercase();
                Self::printable(c, format!("Key{upper}"), upper as u32, false)
            }
            'A'..='Z' => Self::printable(c, format!("Key{c}"), c as u32, true),
            '0'..='9' => Self::printable(c, format!("Digit{c}"), c as u32, false),
            ' ' => Key::Space.stroke(),
            '\n' => Key::Enter.stroke(),
            '\t' => Key::Tab.stroke(),
            _ => {
                if let Some(digit) = SHIFTED_DIGITS.find(c) {
                    let digit = (b'0' + digit as u8) as char;
                    return Self::printable(c, format!("Digit{digit}"), digit as u32, true);
                }
                match PUNCTUATION.iter().find(|p| p.0 == c || p.1 == c) {
                    Some(&(plain, _, code, key_code)) => {
                        Self::printable(c, code, key_code, c != plain)
                    }
                    None => Self::printable(c, "", 0, false),
                }
            }
        }
    }

    /// Returns the synthetic events dispatched when this stroke is typed.
    ///
    /// Order: (Shift down) → keydown → keypress → input → keyup → (Shift up).
    /// `keypress` fires for printable keys and Enter; `input` only for
    /// printable keys.
    #[must_use]
    pub fn events(&self) -> Vec<KeyEvent> {
        let mut events = Vec::with_capacity(6);
        let shift = Key::Shift.stroke();

        if self.shift {
            events.push(KeyEvent::new(KeyEventKind::KeyDown, shift.clone()));
        }
        events.push(KeyEvent::new(KeyEventKind::KeyDown, self.clone()));
        if self.printable || self.key_code == Key::Enter.properties().2 {
            events.push(KeyEvent::new(KeyEventKind::KeyPress, self.clone()));
        }
        if self.printable {
            events.push(KeyEvent::new(KeyEventKind::Input, self.clone()));
        }
        events.push(KeyEvent::new(KeyEventKind::KeyUp, self.clone()));
        if self.shift {
            events.push(KeyEvent::new(KeyEventKind::KeyUp, shift));
        }

        events
    }
}

/// Shifted digit row, indexed by the digit that produces it.
const SHIFTED_DIGITS: &str = ")!@#$%^&*(";

/// (plain, shifted, code, keyCode)
const PUNCTUATION: &[(char, char, &str, u32)] = &[
    ('-', '_', "Minus", 189),
    ('=', '+', "Equal", 187),
    ('[', '{', "BracketLeft", 219),
    (']', '}', "BracketRight", 221),
    ('\\', '|', "Backslash", 220),
    (';', ':', "Semicolon", 186),
    ('\'', '"', "Quote", 222),
    (',', '<', "Comma", 188),
    ('.', '>', "Period", 190),
    ('/', '?', "Slash", 191),
    ('`', '~', "Backquote", 192),
];

// ============================================================================
// KeyEvent
// ============================================================================

/// Synthetic DOM event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    /// `keydown`
    KeyDown,
    /// `keypress`
    KeyPress,
    /// `input`
    Input,
    /// `keyup`
    KeyUp,
}

impl KeyEventKind {
    /// Returns the DOM event type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeyDown => "keydown",
            Self::KeyPress => "keypress",
            Self::Input => "input",
            Self::KeyUp => "keyup",
        }
    }
}

/// One synthetic event to dispatch on an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Event type.
    pub kind: KeyEventKind,
    /// Key the event describes.
    pub stroke: KeyStroke,
}

impl KeyEvent {
    /// Creates a new key event.
    #[inline]
    #[must_use]
    pub fn new(kind: KeyEventKind, stroke: KeyStroke) -> Self {
        Self { kind, stroke }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Expands `text` into the full event sequence a user typing it would produce.
#[must_use]
pub fn input_events(text: &str) -> Vec<KeyEvent> {
    text.chars()
        .flat_map(|c| KeyStroke::for_char(c).events())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
