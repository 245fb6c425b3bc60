//! Key bindings and the help text shown for them.
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;
use crate::input::KeyParseError;

/// A set of keys bound to one action, with the text shown for it in a help bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub keys: Vec<KeyEvent>,
    pub help_key: String,
    pub help_desc: String,
}

impl Binding {
    pub fn new(
        help_key: impl Into<String>,
        help_desc: impl Into<String>,
        keys: Vec<KeyEvent>,
    ) -> Self {
        Self {
            keys,
            help_key: help_key.into(),
            help_desc: help_desc.into(),
        }
    }

    /// Builds a binding from space-separated key notation, e.g. `"q ctrl+c"`. The help bar
    /// shows the first key.
    pub fn parse(keys: &str, help_desc: impl Into<String>) -> Result<Self, KeyParseError> {
        let keys = keys
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<KeyEvent>, _>>()?;
        let help_key = keys.first().ok_or(KeyParseError::Empty)?.to_string();
        Ok(Self::new(help_key, help_desc, keys))
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys.contains(event)
    }
}

/// Bindings mapped to actions of type `A`, checked in insertion order.
#[derive(Clone, Debug)]
pub struct Keymap<A> {
    entries: Vec<(Binding, A)>,
}

impl<A> Default for Keymap<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A: Copy> Keymap<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, binding: Binding, action: A) -> Self {
        self.entries.push((binding, action));
        self
    }

    /// Replaces the keys of every binding for `action`.
    pub fn rebind(&mut self, action: A, keys: Vec<KeyEvent>)
    where
        A: PartialEq,
    {
        for (binding, a) in &mut self.entries {
            if *a == action {
                binding.help_key = keys.first().map(ToString::to_string).unwrap_or_default();
                binding.keys = keys.clone();
            }
        }
    }

    pub fn action(&self, event: &KeyEvent) -> Option<A> {
        self.entries
            .iter()
            .find(|(binding, _)| binding.matches(event))
            .map(|(_, action)| *action)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter().map(|(binding, _)| binding)
    }
}

pub fn key_char(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c))
}

pub fn key_ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(KeyModifiers::ctrl())
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn binding_matches_exact_modifiers() {
        let b = Binding::new("q", "quit", vec![key_char('q'), key(KeyCode::Esc)]);
        assert!(b.matches(&key_char('q')));
        assert!(b.matches(&key(KeyCode::Esc)));
        assert!(!b.matches(&key_ctrl('q')));
    }

    #[test]
    fn parsed_bindings_show_their_first_key() {
        let b = Binding::parse("ctrl+f pgdown", "page down").unwrap();
        assert_eq!(b.help_key, "ctrl+f");
        assert_eq!(b.keys, vec![key_ctrl('f'), key(KeyCode::PageDown)]);
        assert_eq!(Binding::parse("  ", "nothing"), Err(KeyParseError::Empty));
    }

    #[test]
    fn keymap_resolves_in_order_and_rebinds() {
        let mut map = Keymap::new()
            .bind(Binding::parse("q", "quit").unwrap(), 'q')
            .bind(Binding::parse("q r", "reload").unwrap(), 'r');
        assert_eq!(map.action(&key_char('q')), Some('q'));
        assert_eq!(map.action(&key_char('r')), Some('r'));
        assert_eq!(map.action(&key_char('x')), None);

        map.rebind('q', vec![key_ctrl('c')]);
        assert_eq!(map.action(&key_char('q')), Some('r'));
        assert_eq!(map.action(&key_ctrl('c')), Some('q'));
        let keys: Vec<&str> = map.bindings().map(|b| b.help_key.as_str()).collect();
        assert_eq!(keys, vec!["ctrl+c", "q"]);
    }
}
