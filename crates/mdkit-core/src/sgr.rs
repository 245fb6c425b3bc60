//! Minimal SGR deltas between style entries, and the style stack built on them.
//!
//! Every change is written as its own `ESC [ … m` command. A zero target collapses to a single
//! reset; otherwise only attributes that differ from the base are written, in the order
//! background, foreground, bold, underline, italic.
use std::fmt::Write as _;

use crate::theme::Rgb;
use crate::theme::StyleEntry;
use crate::theme::Theme;
use crate::theme::TokenClass;
use crate::theme::Trilean;

pub fn write_sgr(out: &mut String, command: &str) {
    out.push_str("\x1b[");
    out.push_str(command);
    out.push('m');
}

fn write_colour(out: &mut String, command: &str, colour: Rgb) {
    let _ = write!(
        out,
        "\x1b[{command};2;{};{};{}m",
        colour.r, colour.g, colour.b
    );
}

fn write_tristate(out: &mut String, off: &str, on: &str, value: Trilean) {
    write_sgr(out, if value.is_on() { on } else { off });
}

/// Appends the commands that move the terminal from `base` to `target`.
pub fn write_delta(out: &mut String, base: &StyleEntry, target: &StyleEntry) {
    if target.is_zero() {
        write_sgr(out, "0");
        return;
    }

    let fresh = base.is_zero();
    match (target.background, base.background) {
        (Some(bg), prev) if fresh || prev != Some(bg) => write_colour(out, "48", bg),
        (None, Some(_)) => write_sgr(out, "49"),
        _ => {}
    }
    match (target.colour, base.colour) {
        (Some(fg), prev) if fresh || prev != Some(fg) => write_colour(out, "38", fg),
        (None, Some(_)) => write_sgr(out, "39"),
        _ => {}
    }
    if fresh || target.bold != base.bold {
        write_tristate(out, "22", "1", target.bold);
    }
    if fresh || target.underline != base.underline {
        write_tristate(out, "24", "4", target.underline);
    }
    if fresh || target.italic != base.italic {
        write_tristate(out, "23", "3", target.italic);
    }
}

pub fn delta(base: &StyleEntry, target: &StyleEntry) -> String {
    let mut out = String::new();
    write_delta(&mut out, base, target);
    out
}

/// The stack of resolved styles currently active on the terminal.
///
/// `push` and `pop` return the escape bytes the caller must write; both are no-ops without a
/// theme.
#[derive(Clone, Debug, Default)]
pub struct StyleStack {
    theme: Option<Theme>,
    stack: Vec<StyleEntry>,
}

impl StyleStack {
    pub fn new(theme: Option<Theme>) -> Self {
        Self {
            theme,
            stack: Vec::new(),
        }
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    pub fn top(&self) -> StyleEntry {
        self.stack.last().copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Resolves `class` against the theme and the current top, pushes it and returns the delta.
    ///
    /// Unset bold/italic/underline inherit from the current top, so nested emphasis composes. A
    /// class that resolves to the zero style re-pushes the current top so the matching `pop`
    /// stays balanced and writes nothing.
    pub fn push(&mut self, class: TokenClass) -> Option<String> {
        let theme = self.theme.as_ref()?;
        let base = self.top();
        let mut entry = theme.get(class);
        if entry.is_zero() {
            self.stack.push(base);
            return None;
        }

        entry.bold = entry.bold.or(base.bold);
        entry.underline = entry.underline.or(base.underline);
        entry.italic = entry.italic.or(base.italic);
        self.stack.push(entry);
        non_empty(delta(&base, &entry))
    }

    pub fn pop(&mut self) -> Option<String> {
        self.theme.as_ref()?;
        let Some(top) = self.stack.pop() else {
            panic!("pop_style without matching push_style");
        };
        let below = self.top();
        if below == top {
            return None;
        }
        non_empty(delta(&top, &below))
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
