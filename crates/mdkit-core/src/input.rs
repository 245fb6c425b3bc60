//! Backend-neutral input events consumed by the viewer, and the key notation used to
//! configure bindings (`j`, `ctrl+f`, `pgdown`, `space`).
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyModifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Esc,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

/// Names accepted for the non-character keys, first one is canonical.
const NAMED_KEYS: &[(KeyCode, &[&str])] = &[
    (KeyCode::Enter, &["enter", "return"]),
    (KeyCode::Tab, &["tab"]),
    (KeyCode::BackTab, &["backtab"]),
    (KeyCode::Esc, &["esc", "escape"]),
    (KeyCode::Left, &["left"]),
    (KeyCode::Right, &["right"]),
    (KeyCode::Up, &["up"]),
    (KeyCode::Down, &["down"]),
    (KeyCode::Home, &["home"]),
    (KeyCode::End, &["end"]),
    (KeyCode::PageUp, &["pgup", "pageup"]),
    (KeyCode::PageDown, &["pgdown", "pagedown"]),
];

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            named => {
                let name = NAMED_KEYS
                    .iter()
                    .find(|(code, _)| code == named)
                    .map_or("?", |(_, names)| names[0]);
                f.write_str(name)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::none(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("shift+")?;
        }
        write!(f, "{}", self.code)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key")]
    Empty,
    #[error("unknown modifier {0:?}")]
    Modifier(String),
    #[error("unknown key {0:?}")]
    Key(String),
}

/// Parses `[ctrl+][alt+][shift+]KEY`, where `KEY` is a single character, `space` or a key
/// name such as `enter` or `pgdown`. A lone `+` is the plus key.
impl FromStr for KeyEvent {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }
        let (prefix, name) = if let Some(prefix) = s.strip_suffix("++") {
            (prefix, "+")
        } else {
            match s.rfind('+') {
                Some(i) if i > 0 && i + 1 < s.len() => (&s[..i], &s[i + 1..]),
                _ => ("", s),
            }
        };

        let mut modifiers = KeyModifiers::none();
        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                _ => return Err(KeyParseError::Modifier(part.to_owned())),
            }
        }

        let mut chars = name.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => KeyCode::Char(c),
            _ if name.eq_ignore_ascii_case("space") => KeyCode::Char(' '),
            _ => NAMED_KEYS
                .iter()
                .find(|(_, names)| names.iter().any(|n| name.eq_ignore_ascii_case(n)))
                .map(|(code, _)| code.clone())
                .ok_or_else(|| KeyParseError::Key(name.to_owned()))?,
        };
        Ok(KeyEvent { code, modifiers })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
}

/// Only wheel motion reaches the viewer; clicks and drags are dropped at conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    pub kind: MouseEventKind,
}
