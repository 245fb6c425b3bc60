use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::keymap::Binding;
use crate::measure::text_width;
use crate::render;
use crate::theme::Theme;
use crate::theme::TokenClass;

const MORE: &str = "…";

#[derive(Clone, Debug)]
pub struct HelpBarOptions {
    pub style: Style,
    pub key_style: Style,
    pub separator: String,
}

impl Default for HelpBarOptions {
    fn default() -> Self {
        Self {
            style: Style::default(),
            key_style: Style::default().add_modifier(Modifier::BOLD),
            separator: " • ".to_string(),
        }
    }
}

impl HelpBarOptions {
    /// Descriptions in the theme's comment style, keys in its keyword style.
    pub fn themed(theme: &Theme) -> Self {
        Self {
            style: theme.get(TokenClass::Comment).to_style(),
            key_style: theme.get(TokenClass::Keyword).to_style(),
            ..Self::default()
        }
    }
}

/// One-line summary of key bindings, e.g. `q quit • ] next link`.
///
/// Entries that do not fit are dropped whole and replaced by `…`.
#[derive(Clone, Debug, Default)]
pub struct HelpBar {
    bindings: Vec<Binding>,
    options: HelpBarOptions,
}

impl HelpBar {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self {
            bindings,
            options: HelpBarOptions::default(),
        }
    }

    pub fn with_options(bindings: Vec<Binding>, options: HelpBarOptions) -> Self {
        Self { bindings, options }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, self.options.style);
        render::render_spans_clipped(
            area.x,
            area.y,
            0,
            area.width,
            buf,
            &self.spans(usize::from(area.width)),
            self.options.style,
        );
    }

    /// Spans of the entries that fit in `width` columns.
    fn spans(&self, width: usize) -> Vec<Span<'_>> {
        let separator = self.options.separator.as_str();
        let mut spans = Vec::new();
        let mut used = 0;
        for (i, b) in self.bindings.iter().enumerate() {
            let gap = if i > 0 { text_width(separator) } else { 0 };
            let entry = text_width(&b.help_key) + 1 + text_width(&b.help_desc);
            if used + gap + entry > width {
                if used + gap + text_width(MORE) <= width {
                    if i > 0 {
                        spans.push(Span::styled(separator, self.options.style));
                    }
                    spans.push(Span::styled(MORE, self.options.style));
                }
                break;
            }
            if i > 0 {
                spans.push(Span::styled(separator, self.options.style));
            }
            spans.push(Span::styled(b.help_key.as_str(), self.options.key_style));
            spans.push(Span::styled(" ", self.options.style));
            spans.push(Span::styled(b.help_desc.as_str(), self.options.style));
            used += gap + entry;
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap;
    use pretty_assertions::assert_eq;

    fn row(bar: &HelpBar, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render_ref(area, &mut buf);
        (0..width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    fn bar() -> HelpBar {
        HelpBar::new(vec![
            keymap::Binding::new("q", "quit", vec![keymap::key_char('q')]),
            keymap::Binding::new("]", "next link", vec![keymap::key_char(']')]),
        ])
    }

    #[test]
    fn lists_every_binding_that_fits() {
        assert_eq!(row(&bar(), 22), "q quit • ] next link  ");
    }

    #[test]
    fn drops_entries_whole() {
        assert_eq!(row(&bar(), 12), "q quit • …  ");
        assert_eq!(row(&bar(), 8), "q quit  ");
    }

    #[test]
    fn keys_are_bold_by_default() {
        let area = Rect::new(0, 0, 8, 1);
        let mut buf = Buffer::empty(area);
        bar().render_ref(area, &mut buf);
        assert!(buf[(0, 0)].modifier.contains(Modifier::BOLD));
        assert!(!buf[(2, 0)].modifier.contains(Modifier::BOLD));
    }
}
