//! Scrolling a [`ViewportState`] from keys and the mouse wheel.
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap::Binding;
use crate::keymap::Keymap;
use crate::keymap::key;
use crate::keymap::key_char;
use crate::keymap::key_ctrl;
use crate::viewport::ViewportState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAction {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Clone, Debug)]
pub struct ScrollBindings {
    pub line_step: i32,
    pub horiz_step: i32,
    /// Lines per wheel notch.
    pub wheel_step: i32,
    pub keymap: Keymap<ScrollAction>,
}

impl Default for ScrollBindings {
    fn default() -> Self {
        use KeyCode::*;

        let keymap = Keymap::new()
            .bind(Binding::new("↑/k", "up", vec![key(Up), key_char('k')]), ScrollAction::Up)
            .bind(
                Binding::new("↓/j", "down", vec![key(Down), key_char('j')]),
                ScrollAction::Down,
            )
            .bind(
                Binding::new("←/h", "left", vec![key(Left), key_char('h')]),
                ScrollAction::Left,
            )
            .bind(
                Binding::new("→/l", "right", vec![key(Right), key_char('l')]),
                ScrollAction::Right,
            )
            .bind(
                Binding::new("pgup", "page up", vec![key(PageUp), key_ctrl('b')]),
                ScrollAction::PageUp,
            )
            .bind(
                Binding::new("pgdown", "page down", vec![key(PageDown), key_ctrl('f'), key_char(' ')]),
                ScrollAction::PageDown,
            )
            .bind(Binding::new("g", "top", vec![key(Home), key_char('g')]), ScrollAction::Top)
            .bind(
                Binding::new("G", "bottom", vec![key(End), key_char('G')]),
                ScrollAction::Bottom,
            );
        Self {
            line_step: 1,
            horiz_step: 4,
            wheel_step: 3,
            keymap,
        }
    }
}

impl ScrollBindings {
    pub fn action_for(&self, key: &KeyEvent) -> Option<ScrollAction> {
        self.keymap.action(key)
    }

    pub fn apply(&self, state: &mut ViewportState, action: ScrollAction) {
        match action {
            ScrollAction::Up => state.scroll_y_by(-self.line_step),
            ScrollAction::Down => state.scroll_y_by(self.line_step),
            ScrollAction::Left => state.scroll_x_by(-self.horiz_step),
            ScrollAction::Right => state.scroll_x_by(self.horiz_step),
            ScrollAction::PageUp => state.page_up(),
            ScrollAction::PageDown => state.page_down(),
            ScrollAction::Top => state.to_top(),
            ScrollAction::Bottom => state.to_bottom(),
        }
    }

    pub fn apply_mouse(&self, state: &mut ViewportState, event: &MouseEvent) {
        match event.kind {
            MouseEventKind::ScrollUp => state.scroll_y_by(-self.wheel_step),
            MouseEventKind::ScrollDown => state.scroll_y_by(self.wheel_step),
            MouseEventKind::ScrollLeft => state.scroll_x_by(-self.wheel_step),
            MouseEventKind::ScrollRight => state.scroll_x_by(self.wheel_step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vi_keys_and_arrows_share_actions() {
        let b = ScrollBindings::default();
        assert_eq!(b.action_for(&key_char('j')), Some(ScrollAction::Down));
        assert_eq!(b.action_for(&key(KeyCode::Down)), Some(ScrollAction::Down));
        assert_eq!(b.action_for(&key_char(' ')), Some(ScrollAction::PageDown));
        assert_eq!(b.action_for(&key_char('G')), Some(ScrollAction::Bottom));
        assert_eq!(b.action_for(&key_char('x')), None);
    }

    #[test]
    fn rebinding_replaces_keys() {
        let mut b = ScrollBindings::default();
        b.keymap.rebind(ScrollAction::Down, vec![key_char('n')]);
        assert_eq!(b.action_for(&key_char('j')), None);
        assert_eq!(b.action_for(&key_char('n')), Some(ScrollAction::Down));
    }

    #[test]
    fn apply_moves_viewport() {
        let b = ScrollBindings::default();
        let mut s = ViewportState::default();
        s.set_viewport(10, 5);
        s.set_content(10, 50);
        b.apply(&mut s, ScrollAction::Down);
        b.apply(&mut s, ScrollAction::PageDown);
        assert_eq!(s.y, 6);
        b.apply_mouse(
            &mut s,
            &MouseEvent {
                x: 0,
                y: 0,
                kind: MouseEventKind::ScrollUp,
            },
        );
        assert_eq!(s.y, 3);
    }
}
