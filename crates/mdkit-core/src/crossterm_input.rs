//! Conversions from crossterm events.
use crossterm::event as ct;

use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;

/// Converts a crossterm event, dropping key releases/repeats and events the viewers ignore.
pub fn input_event_from_crossterm(ev: ct::Event) -> Option<InputEvent> {
    match ev {
        ct::Event::Key(key) if key.kind == ct::KeyEventKind::Press => {
            key_event_from_crossterm(key).map(InputEvent::Key)
        }
        ct::Event::Mouse(m) => mouse_event_from_crossterm(m).map(InputEvent::Mouse),
        ct::Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        _ => None,
    }
}

pub fn key_event_from_crossterm(key: ct::KeyEvent) -> Option<KeyEvent> {
    let code = match key.code {
        ct::KeyCode::Char(c) => KeyCode::Char(c),
        ct::KeyCode::Enter => KeyCode::Enter,
        ct::KeyCode::Tab => KeyCode::Tab,
        ct::KeyCode::BackTab => KeyCode::BackTab,
        ct::KeyCode::Esc => KeyCode::Esc,
        ct::KeyCode::Left => KeyCode::Left,
        ct::KeyCode::Right => KeyCode::Right,
        ct::KeyCode::Up => KeyCode::Up,
        ct::KeyCode::Down => KeyCode::Down,
        ct::KeyCode::Home => KeyCode::Home,
        ct::KeyCode::End => KeyCode::End,
        ct::KeyCode::PageUp => KeyCode::PageUp,
        ct::KeyCode::PageDown => KeyCode::PageDown,
        _ => return None,
    };

    // Shifted characters already arrive as their uppercase/symbol form.
    let mut modifiers = modifiers_from_crossterm(key.modifiers);
    if matches!(code, KeyCode::Char(_)) {
        modifiers.shift = false;
    }
    Some(KeyEvent { code, modifiers })
}

pub fn mouse_event_from_crossterm(m: ct::MouseEvent) -> Option<MouseEvent> {
    let kind = match m.kind {
        ct::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        ct::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        ct::MouseEventKind::ScrollLeft => MouseEventKind::ScrollLeft,
        ct::MouseEventKind::ScrollRight => MouseEventKind::ScrollRight,
        _ => return None,
    };
    Some(MouseEvent {
        x: m.column,
        y: m.row,
        kind,
    })
}

fn modifiers_from_crossterm(m: ct::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: m.contains(ct::KeyModifiers::SHIFT),
        ctrl: m.contains(ct::KeyModifiers::CONTROL),
        alt: m.contains(ct::KeyModifiers::ALT),
    }
}
