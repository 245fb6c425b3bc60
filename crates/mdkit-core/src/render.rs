//! Low-level buffer painting shared by the widgets.
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    let view_h = u32::from(state.viewport_h);
    if state.content_h <= view_h || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = f64::from(area.height);
    let thumb_h = ((f64::from(view_h) / f64::from(state.content_h)) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;
    let max_y = f64::from(state.content_h.saturating_sub(view_h).max(1));
    let free = (track_h - f64::from(thumb_h)).max(0.0);
    let thumb_top = ((f64::from(state.y) / max_y) * free).round().clamp(0.0, free) as u16;

    for dy in 0..area.height {
        let ch = if (thumb_top..thumb_top + thumb_h).contains(&dy) {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Paints graphemes left to right into one row, skipping the first `start_col` columns and
/// stopping after `max_cols`.
///
/// A wide grapheme that straddles either edge is dropped rather than split.
pub struct RowPainter<'a> {
    buf: &'a mut Buffer,
    x: u16,
    y: u16,
    start_col: usize,
    max_cols: usize,
    col: usize,
    out: usize,
}

impl<'a> RowPainter<'a> {
    pub fn new(buf: &'a mut Buffer, x: u16, y: u16, start_col: u32, max_cols: u16) -> Self {
        Self {
            buf,
            x,
            y,
            start_col: start_col as usize,
            max_cols: usize::from(max_cols),
            col: 0,
            out: 0,
        }
    }

    /// Columns painted so far.
    pub fn painted(&self) -> u16 {
        self.out as u16
    }

    pub fn is_full(&self) -> bool {
        self.out >= self.max_cols
    }

    /// Paints one grapheme. Returns `false` once the row is full.
    pub fn grapheme(&mut self, g: &str, style: Style) -> bool {
        if g == "\t" {
            for _ in 0..4 {
                if !self.grapheme(" ", style) {
                    return false;
                }
            }
            return true;
        }
        let w = g.width();
        if w == 0 {
            return !self.is_full();
        }
        if self.col < self.start_col {
            self.col += w;
            return true;
        }
        if self.out + w > self.max_cols {
            self.out = self.max_cols;
            return false;
        }
        let x = self.x + self.out as u16;
        if let Some(cell) = self.buf.cell_mut((x, self.y)) {
            cell.set_symbol(g);
            cell.set_style(style);
        }
        for dx in 1..w {
            if let Some(cell) = self.buf.cell_mut((x + dx as u16, self.y)) {
                cell.set_symbol("");
                cell.set_style(style);
            }
        }
        self.col += w;
        self.out += w;
        true
    }

    pub fn text(&mut self, s: &str, style: Style) -> bool {
        s.graphemes(true).all(|g| self.grapheme(g, style))
    }

    /// Fills the rest of the row with blanks.
    pub fn fill(&mut self, style: Style) {
        while !self.is_full() {
            let x = self.x + self.out as u16;
            if let Some(cell) = self.buf.cell_mut((x, self.y)) {
                cell.set_symbol(" ");
                cell.set_style(style);
            }
            self.out += 1;
        }
    }
}

pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    RowPainter::new(buf, x, y, start_col, max_cols).text(input, style);
}

pub fn render_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'_>],
    fallback_style: Style,
) {
    let mut painter = RowPainter::new(buf, x, y, start_col, max_cols);
    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            span.style
        };
        if !painter.text(&span.content, style) {
            return;
        }
    }
}
