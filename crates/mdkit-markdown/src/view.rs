//! A scrollable Markdown reader widget with link and heading navigation.
//!
//! [`MarkdownView`] renders its document with the same [`Renderer`] `mdcat` uses, wrapped to the
//! widget width and with hyperlinks shown as underlined text, then splits the escaped output into
//! lines of styled grapheme cells. Every cell remembers its byte offset in the output, so the
//! [`SpanTree`] returned by the renderer maps straight onto the screen: selecting a node is a
//! matter of reversing the cells inside its span.
//!
//! The view re-renders only when the markdown, the highlighter or the wrap width changes.
use std::ops::Range;
use std::sync::Arc;

use ansi_to_tui::IntoText;
use mdkit_core::help::HelpBar;
use mdkit_core::help::HelpBarOptions;
use mdkit_core::input::InputEvent;
use mdkit_core::input::KeyCode;
use mdkit_core::input::KeyEvent;
use mdkit_core::keymap::Binding;
use mdkit_core::keymap::key;
use mdkit_core::keymap::key_char;
use mdkit_core::measure::Segment;
use mdkit_core::measure::segments;
use mdkit_core::render;
use mdkit_core::render::RowPainter;
use mdkit_core::scroll::ScrollBindings;
use mdkit_core::text::CodeHighlighter;
use mdkit_core::theme::Theme;
use mdkit_core::theme::TokenClass;
use mdkit_core::viewport::ViewportState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use unicode_segmentation::UnicodeSegmentation;

use crate::ast::Document;
use crate::ast::NodeId;
use crate::ast::NodeKind;
use crate::index::DocumentIndex;
use crate::render::Renderer;
use crate::render::RendererOptions;
use crate::span::SpanBuilder;
use crate::span::SpanId;
use crate::span::SpanTree;

/// Reserved for the position readout at the right of the gutter.
const GUTTER_POSITION: usize = " 100% ".len();
const ELLIPSIS: &str = "...";

/// What the host should do after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewAction {
    None,
    Redraw,
    /// The user followed a link that does not point into the document.
    Open(String),
}

/// Node kinds the selection can jump between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Links, images and autolinks. Selected links are drawn reversed.
    Link,
    /// Headings are scrolled to but not highlighted.
    Heading,
}

impl Target {
    fn matches(self, role: &NodeRole) -> bool {
        match self {
            Target::Link => matches!(role, NodeRole::Link(_)),
            Target::Heading => matches!(role, NodeRole::Heading),
        }
    }

    fn highlights(self) -> bool {
        self == Target::Link
    }
}

#[derive(Clone, Debug)]
pub struct NavigationBindings {
    pub next_link: Binding,
    pub previous_link: Binding,
    pub next_heading: Binding,
    pub previous_heading: Binding,
    pub follow: Binding,
    pub clear: Binding,
}

impl Default for NavigationBindings {
    fn default() -> Self {
        Self {
            next_link: Binding::new("]", "next link", vec![key_char(']')]),
            previous_link: Binding::new("[", "prev link", vec![key_char('[')]),
            next_heading: Binding::new("}", "next heading", vec![key_char('}')]),
            previous_heading: Binding::new("{", "prev heading", vec![key_char('{')]),
            follow: Binding::new("enter", "follow", vec![key(KeyCode::Enter)]),
            clear: Binding::new("esc", "clear", vec![key(KeyCode::Esc)]),
        }
    }
}

impl NavigationBindings {
    /// The bindings in the order a help bar lists them.
    pub fn help(&self) -> Vec<Binding> {
        vec![
            self.next_link.clone(),
            self.previous_link.clone(),
            self.next_heading.clone(),
            self.previous_heading.clone(),
            self.follow.clone(),
            self.clear.clone(),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct MarkdownViewOptions {
    /// Styles for the rendered document and the gutter. `None` draws plain text.
    pub theme: Option<Theme>,
    /// Wrap to the widget width. Without it, long lines scroll horizontally.
    pub wrap: bool,
    pub show_scrollbar: bool,
    /// Reserve the bottom row for the document name and scroll position.
    pub show_gutter: bool,
    pub scroll: ScrollBindings,
    pub navigation: NavigationBindings,
}

impl Default for MarkdownViewOptions {
    fn default() -> Self {
        Self {
            theme: Some(Theme::pulumi()),
            wrap: true,
            show_scrollbar: true,
            show_gutter: true,
            scroll: ScrollBindings::default(),
            navigation: NavigationBindings::default(),
        }
    }
}

/// What the view needs to know about a node after its document is gone.
#[derive(Clone, Debug, PartialEq, Eq)]
enum NodeRole {
    Other,
    Heading,
    Link(String),
}

/// One grapheme of rendered output. A line's terminating newline is a cell of its own.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    start: usize,
    end: usize,
    style: Style,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Line {
    /// Output bytes covered by the line, escapes included.
    bytes: Range<usize>,
    cells: Range<usize>,
}

#[derive(Clone, Debug)]
struct Layout {
    wrap_width: usize,
    output: String,
    cells: Vec<Cell>,
    lines: Vec<Line>,
    longest: usize,
    spans: SpanTree,
    roles: Vec<NodeRole>,
    index: DocumentIndex,
}

impl Layout {
    fn symbol(&self, cell: &Cell) -> &str {
        let s = &self.output[cell.start..cell.end];
        if s.ends_with('\n') { " " } else { s }
    }

    fn is_space(&self, cell: &Cell) -> bool {
        self.output[cell.start..cell.end]
            .chars()
            .all(char::is_whitespace)
    }

    /// The first cell ending after `offset`.
    fn cell_from(&self, offset: usize) -> Option<&Cell> {
        let i = self.cells.partition_point(|c| c.end <= offset);
        self.cells.get(i)
    }

    /// The last cell starting before `offset`.
    fn cell_before(&self, offset: usize) -> Option<&Cell> {
        let i = self.cells.partition_point(|c| c.start < offset);
        i.checked_sub(1).map(|i| &self.cells[i])
    }

    /// The line holding output byte `offset`; offsets past the end map to the last line.
    fn line_of(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|l| l.bytes.end <= offset)
            .min(self.lines.len().saturating_sub(1))
    }

    /// Shrinks `span` to exclude leading and trailing whitespace cells.
    fn trim(&self, span: Range<usize>) -> Range<usize> {
        let (mut start, mut end) = (span.start, span.end);
        while start < end {
            match self.cell_from(start) {
                Some(c) if c.start < end && self.is_space(c) => start = c.end,
                Some(c) if c.start < end => {
                    start = c.start;
                    break;
                }
                _ => break,
            }
        }
        while end > start {
            match self.cell_before(end) {
                Some(c) if c.end > start && self.is_space(c) => end = c.start,
                Some(c) if c.end > start => {
                    end = c.end;
                    break;
                }
                _ => break,
            }
        }
        start..end.max(start)
    }

    /// A selection of `span`, trimmed to its visible text.
    fn selection(&self, span: SpanId, highlight: bool) -> Selection {
        let node_span = self.spans.get(span);
        let range = self.trim(node_span.start..node_span.end);
        Selection {
            node: node_span.node,
            span,
            start: range.start,
            end: range.end,
            highlight,
        }
    }

    fn role(&self, span: SpanId) -> &NodeRole {
        self.roles
            .get(self.spans.get(span).node.index())
            .unwrap_or(&NodeRole::Other)
    }

    /// Style of the last cell before line `line`, used to fill the rest of rows.
    fn carried_style(&self, line: usize) -> Style {
        self.lines[..line.min(self.lines.len())]
            .iter()
            .rev()
            .find_map(|l| self.cells[l.cells.clone()].last())
            .map_or(Style::default(), |c| {
                c.style.remove_modifier(Modifier::UNDERLINED)
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Selection {
    node: NodeId,
    span: SpanId,
    start: usize,
    end: usize,
    highlight: bool,
}

impl Selection {
    fn covers(&self, offset: usize) -> bool {
        self.highlight && self.start <= offset && offset < self.end
    }
}

#[derive(Clone, Default)]
pub struct MarkdownView {
    name: String,
    source: String,
    pub state: ViewportState,
    options: MarkdownViewOptions,
    highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,
    layout: Option<Layout>,
    selection: Option<Selection>,
}

impl MarkdownView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MarkdownViewOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &MarkdownViewOptions {
        &self.options
    }

    /// Replaces the document and drops the selection.
    pub fn set_markdown(&mut self, input: &str) {
        self.source = input.to_string();
        self.layout = None;
        self.selection = None;
        self.state.to_top();
    }

    pub fn markdown(&self) -> &str {
        &self.source
    }

    /// Sets the document name shown in the gutter.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sets an optional highlighter used for code blocks.
    pub fn set_highlighter(&mut self, highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>) {
        self.highlighter = highlighter;
        self.layout = None;
    }

    pub fn set_wrap(&mut self, wrap: bool) {
        if self.options.wrap != wrap {
            self.layout = None;
        }
        self.options.wrap = wrap;
    }

    pub fn set_gutter(&mut self, show_gutter: bool) {
        self.options.show_gutter = show_gutter;
    }

    /// Updates viewport size for `area`, minus the scrollbar column and gutter row.
    pub fn set_viewport(&mut self, area: Rect) {
        let (text, _, _) = self.split(area);
        self.state.set_viewport(text.width, text.height);
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        self.state.scroll_y_by(delta);
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        self.state.scroll_x_by(delta);
    }

    /// Number of rendered lines, or `0` before the first draw.
    pub fn line_count(&self) -> usize {
        self.layout.as_ref().map_or(0, |l| l.lines.len())
    }

    /// The visible text of rendered line `line`, without its newline.
    pub fn line_text(&self, line: usize) -> Option<String> {
        let layout = self.layout.as_ref()?;
        let line = layout.lines.get(line)?;
        Some(
            layout.cells[line.cells.clone()]
                .iter()
                .filter(|c| !layout.output[c.start..c.end].ends_with('\n'))
                .map(|c| layout.symbol(c))
                .collect(),
        )
    }

    /// The selected node, if any.
    pub fn selection(&self) -> Option<NodeId> {
        self.selection.map(|s| s.node)
    }

    /// Output byte range of the selection, whitespace trimmed.
    pub fn selection_range(&self) -> Option<Range<usize>> {
        self.selection.map(|s| s.start..s.end)
    }

    /// Destination of the selected link.
    pub fn selected_destination(&self) -> Option<&str> {
        let selection = self.selection?;
        match self.layout.as_ref()?.role(selection.span) {
            NodeRole::Link(destination) => Some(destination),
            _ => None,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Help bar listing the navigation keys.
    pub fn help_bar(&self) -> HelpBar {
        let bindings = self.options.navigation.help();
        match &self.options.theme {
            Some(theme) => HelpBar::with_options(bindings, HelpBarOptions::themed(theme)),
            None => HelpBar::new(bindings),
        }
    }

    /// Selects the first `target` after the selection, or after the start of the document.
    ///
    /// Returns `false`, leaving the selection alone, when there is none.
    pub fn select_next(&mut self, target: Target) -> bool {
        let Some(layout) = &self.layout else {
            return false;
        };
        let from = self.selection.map_or(layout.spans.root(), |s| s.span);
        let found = layout
            .spans
            .next_matching(from, |span| {
                layout
                    .roles
                    .get(span.node.index())
                    .is_some_and(|role| target.matches(role))
            });
        match found {
            Some(span) => {
                self.select(span, target.highlights());
                true
            }
            None => false,
        }
    }

    /// Selects the last `target` before the selection, or before the end of the document.
    pub fn select_previous(&mut self, target: Target) -> bool {
        let Some(layout) = &self.layout else {
            return false;
        };
        let found = match self.selection {
            Some(s) => layout.spans.prev_matching(s.span, |span| {
                layout
                    .roles
                    .get(span.node.index())
                    .is_some_and(|role| target.matches(role))
            }),
            None => layout
                .spans
                .iter()
                .filter(|(id, _)| target.matches(layout.role(*id)))
                .map(|(id, _)| id)
                .last(),
        };
        match found {
            Some(span) => {
                self.select(span, target.highlights());
                true
            }
            None => false,
        }
    }

    /// Follows the selected link. Links to `#anchor` jump to the matching heading.
    pub fn follow(&mut self) -> ViewAction {
        let Some(destination) = self.selected_destination().map(str::to_owned) else {
            return ViewAction::None;
        };
        let Some(anchor) = destination.strip_prefix('#') else {
            return ViewAction::Open(destination);
        };
        let Some(layout) = &self.layout else {
            return ViewAction::None;
        };
        let heading = layout
            .index
            .lookup(anchor)
            .first()
            .map(|id| layout.index.section(*id).start)
            .and_then(|node| layout.spans.span_of(node));
        match heading {
            Some(span) => {
                self.select(span, false);
                ViewAction::Redraw
            }
            None => {
                tracing::debug!(anchor, "no heading for anchor");
                ViewAction::None
            }
        }
    }

    /// Scrolls so the line holding output byte `offset` is at the top.
    pub fn scroll_to_offset(&mut self, offset: usize) {
        if let Some(layout) = &self.layout
            && !layout.lines.is_empty()
        {
            let line = layout.line_of(offset);
            self.state.scroll_to_line(u32::try_from(line).unwrap_or(u32::MAX));
        }
    }

    fn select(&mut self, span: SpanId, highlight: bool) {
        let Some(layout) = &self.layout else {
            return;
        };
        let start = layout.spans.get(span).start;
        self.selection = Some(layout.selection(span, highlight));
        self.scroll_to_offset(start);
    }

    /// Handles an event and returns what the host should do next.
    pub fn handle_event_action(&mut self, event: InputEvent) -> ViewAction {
        match event {
            InputEvent::Resize { .. } => ViewAction::Redraw,
            InputEvent::Mouse(m) => {
                self.options.scroll.apply_mouse(&mut self.state, &m);
                ViewAction::Redraw
            }
            InputEvent::Key(key) => self.handle_key(&key),
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ViewAction {
        let nav = &self.options.navigation;
        let moved = if nav.next_link.matches(key) {
            self.select_next(Target::Link)
        } else if nav.previous_link.matches(key) {
            self.select_previous(Target::Link)
        } else if nav.next_heading.matches(key) {
            self.select_next(Target::Heading)
        } else if nav.previous_heading.matches(key) {
            self.select_previous(Target::Heading)
        } else if nav.follow.matches(key) {
            return self.follow();
        } else if nav.clear.matches(key) {
            let had = self.selection.take().is_some();
            return if had { ViewAction::Redraw } else { ViewAction::None };
        } else if let Some(action) = self.options.scroll.action_for(key) {
            self.options.scroll.apply(&mut self.state, action);
            return ViewAction::Redraw;
        } else {
            return ViewAction::None;
        };
        if moved {
            ViewAction::Redraw
        } else {
            ViewAction::None
        }
    }

    /// Text area, scrollbar column and gutter row of `area`.
    fn split(&self, area: Rect) -> (Rect, Option<Rect>, Option<Rect>) {
        let (body, gutter) = if self.options.show_gutter && area.height >= 2 {
            (
                Rect::new(area.x, area.y, area.width, area.height - 1),
                Some(Rect::new(area.x, area.y + area.height - 1, area.width, 1)),
            )
        } else {
            (area, None)
        };
        if self.options.show_scrollbar && body.width >= 2 {
            (
                Rect::new(body.x, body.y, body.width - 1, body.height),
                Some(Rect::new(body.x + body.width - 1, body.y, 1, body.height)),
                gutter,
            )
        } else {
            (body, None, gutter)
        }
    }

    fn ensure_layout(&mut self, width: u16) {
        let wrap_width = if self.options.wrap {
            usize::from(width)
        } else {
            0
        };
        if self
            .layout
            .as_ref()
            .is_some_and(|l| l.wrap_width == wrap_width)
        {
            return;
        }

        let layout = build_layout(
            &self.source,
            &self.options,
            self.highlighter.clone(),
            wrap_width,
        );
        tracing::debug!(width = wrap_width, lines = layout.lines.len(), "rendered markdown");
        self.state.set_content(
            u32::try_from(layout.longest).unwrap_or(u32::MAX),
            u32::try_from(layout.lines.len()).unwrap_or(u32::MAX),
        );

        // Carry the selection over to the new layout by node.
        let reselect = self
            .selection
            .and_then(|s| Some((layout.spans.span_of(s.node)?, s.highlight)));
        self.selection = reselect.map(|(span, highlight)| layout.selection(span, highlight));
        self.layout = Some(layout);
    }

    pub fn render_ref(&mut self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (text, scrollbar, gutter) = self.split(area);
        self.ensure_layout(text.width);
        self.state.set_viewport(text.width, text.height);
        let Some(layout) = &self.layout else {
            return;
        };

        let first = self.state.y as usize;
        let mut fill = layout.carried_style(first);
        for row in 0..text.height {
            let y = text.y + row;
            let mut painter = RowPainter::new(buf, text.x, y, self.state.x, text.width);
            if let Some(line) = layout.lines.get(first + usize::from(row)) {
                let cells = &layout.cells[line.cells.clone()];
                for cell in cells {
                    let mut style = cell.style;
                    if self.selection.is_some_and(|s| s.covers(cell.start)) {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    if !painter.grapheme(layout.symbol(cell), style) {
                        break;
                    }
                }
                if let Some(last) = cells.last() {
                    fill = last.style.remove_modifier(Modifier::UNDERLINED);
                }
            }
            painter.fill(fill);
        }

        let theme = self.options.theme.as_ref();
        if let Some(bar) = scrollbar {
            let style = theme.map_or(Style::default(), |t| t.get(TokenClass::Comment).to_style());
            render::render_scrollbar(bar, buf, &self.state, style);
        }
        if let Some(row) = gutter {
            self.render_gutter(row, buf);
        }
    }

    fn render_gutter(&self, area: Rect, buf: &mut Buffer) {
        let theme = self.options.theme.as_ref();
        let name_style = theme.map_or(Style::default().add_modifier(Modifier::REVERSED), |t| {
            t.get(TokenClass::Comment).to_style()
        });
        let position_style = theme.map_or(Style::default().add_modifier(Modifier::REVERSED), |t| {
            t.get(TokenClass::Text).to_style()
        });
        let percent = self.state.percent_y().unwrap_or(100);
        let Some((name, position)) = gutter_text(&self.name, usize::from(area.width), percent)
        else {
            return;
        };
        buf.set_style(area, name_style);
        let mut painter = RowPainter::new(buf, area.x, area.y, 0, area.width);
        painter.text(&name, name_style);
        painter.text(&position, position_style);
    }
}

/// Splits the gutter into the (possibly truncated) name padded to fill the row, and the
/// position readout. `None` when the row cannot even hold the readout.
fn gutter_text(name: &str, width: usize, percent: u8) -> Option<(String, String)> {
    if width < GUTTER_POSITION - 1 {
        return None;
    }
    let room = width.saturating_sub(GUTTER_POSITION);
    let graphemes: Vec<&str> = name.graphemes(true).collect();
    let mut shown = if room > graphemes.len() {
        name.to_string()
    } else if room > ELLIPSIS.len() {
        let mut s = graphemes[..room - ELLIPSIS.len()].concat();
        s.push_str(ELLIPSIS);
        s
    } else {
        String::new()
    };
    let used = shown.graphemes(true).count();
    shown.push_str(&" ".repeat(room.saturating_sub(used)));
    Some((shown, format!(" {percent:3}% ")))
}

fn build_layout(
    source: &str,
    options: &MarkdownViewOptions,
    highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,
    wrap_width: usize,
) -> Layout {
    let doc = Document::parse(source);
    let mut renderer = Renderer::new(RendererOptions {
        theme: options.theme.clone(),
        word_wrap: wrap_width,
        hyperlinks: true,
        ..RendererOptions::default()
    });
    if let Some(highlighter) = highlighter {
        renderer = renderer.with_highlighter(highlighter);
    }

    let (output, spans) = match renderer.render_to_string(&doc) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::warn!(%err, "rendering markdown failed");
            let output = format!("error rendering Markdown: {err}\n");
            let mut spans = SpanBuilder::new();
            spans.open(doc.root(), 0);
            spans.close(output.len());
            (output, spans.finish(|offset| offset, |offset| offset))
        }
    };

    let mut roles = vec![NodeRole::Other; doc.len()];
    for id in doc.descendants(doc.root()) {
        roles[id.index()] = match doc.kind(id) {
            NodeKind::Heading { .. } => NodeRole::Heading,
            kind => match kind.destination() {
                Some(destination) => NodeRole::Link(destination.to_owned()),
                None => NodeRole::Other,
            },
        };
    }

    let (cells, lines) = index_lines(&output);
    let longest = lines
        .iter()
        .map(|l| l.cells.len().saturating_sub(1))
        .max()
        .unwrap_or(0);
    Layout {
        wrap_width,
        index: DocumentIndex::build(&doc),
        output,
        cells,
        lines,
        longest,
        spans,
        roles,
    }
}

/// Splits escaped output into styled grapheme cells and lines of cells.
fn index_lines(output: &str) -> (Vec<Cell>, Vec<Line>) {
    let mut styles = char_styles(output).into_iter();
    let mut cells = Vec::new();
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut line_start = (0, 0);

    for segment in segments(output) {
        match segment {
            Segment::Escape(escape) => offset += escape.len(),
            Segment::Text(text) => {
                for (i, g) in text.grapheme_indices(true) {
                    let start = offset + i;
                    let end = start + g.len();
                    let style = styles.next().unwrap_or_default();
                    for _ in 1..g.chars().count() {
                        styles.next();
                    }
                    cells.push(Cell { start, end, style });
                    if g.ends_with('\n') {
                        lines.push(Line {
                            bytes: line_start.0..end,
                            cells: line_start.1..cells.len(),
                        });
                        line_start = (end, cells.len());
                    }
                }
                offset += text.len();
            }
        }
    }
    if line_start.1 < cells.len() {
        lines.push(Line {
            bytes: line_start.0..offset,
            cells: line_start.1..cells.len(),
        });
    }
    (cells, lines)
}

/// Style of every visible character of `output`, newlines included. Only the SGR escapes
/// reach the parser; hyperlinks and graphics carry no style.
fn char_styles(output: &str) -> Vec<Style> {
    let sgr: String = segments(output)
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Escape(escape) if escape.starts_with("\x1b[") && escape.ends_with('m') => {
                Some(escape)
            }
            Segment::Escape(_) => None,
        })
        .collect();
    let text = match sgr.as_bytes().into_text() {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%err, "reading output styles failed");
            return Vec::new();
        }
    };

    let mut styles = Vec::with_capacity(sgr.len());
    let mut last = Style::default();
    for (i, line) in text.lines.iter().enumerate() {
        if i > 0 {
            styles.push(last);
        }
        for span in &line.spans {
            last = line.style.patch(span.style);
            styles.extend(span.content.chars().map(|_| last));
        }
    }
    styles
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::style::Color;

    const DOC: &str = "\
# Intro

See [docs](https://x.dev) and [below](#details).

## Details

Plain text.
";

    fn plain_options() -> MarkdownViewOptions {
        MarkdownViewOptions {
            theme: None,
            show_scrollbar: false,
            show_gutter: false,
            ..MarkdownViewOptions::default()
        }
    }

    fn view(src: &str, width: u16, height: u16) -> (MarkdownView, Buffer) {
        let mut view = MarkdownView::with_options(plain_options());
        view.set_markdown(src);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);
        (view, buf)
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn cells_take_colours_from_sgr_escapes() {
        let (cells, lines) =
            index_lines("\x1b[38;2;1;2;3ma\x1b[0m \x1b]8;;https://x.dev\x1b\\b\x1b]8;;\x1b\\\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[2].start, 39);
        assert_eq!(cells[0].style.fg, Some(Color::Rgb(1, 2, 3)));
        assert_ne!(cells[2].style.fg, Some(Color::Rgb(1, 2, 3)));
    }

    #[test]
    fn lines_keep_output_offsets_across_escapes() {
        let (cells, lines) = index_lines("a\x1b[1mb\nc");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].bytes, 0..7);
        assert_eq!(lines[1].bytes, 7..8);
        assert_eq!((cells[1].start, cells[1].end), (5, 6));
        assert!(cells[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(!cells[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn renders_wrapped_text() {
        let (view, buf) = view("one two three four\n", 9, 3);
        assert_eq!(view.line_count(), 3);
        assert_eq!(row(&buf, 0), "one two  ");
        assert_eq!(row(&buf, 1), "three    ");
        assert_eq!(row(&buf, 2), "four     ");
        assert_eq!(view.line_text(2).as_deref(), Some("four     "));
        assert_eq!(view.line_text(3), None);
    }

    #[test]
    fn unwrapped_text_scrolls_sideways() {
        let (mut view, _) = view("one two three four\n", 9, 3);
        view.set_wrap(false);
        let area = Rect::new(0, 0, 9, 3);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);
        assert_eq!(view.line_count(), 1);
        assert_eq!(row(&buf, 0), "one two t");
        view.scroll_x_by(4);
        view.render_ref(area, &mut buf);
        assert_eq!(row(&buf, 0), "two three");
    }

    #[test]
    fn clearing_and_gutter_toggles() {
        let (mut view, _) = view("see [docs](x)\n", 20, 3);
        assert!(view.select_next(Target::Link));
        view.clear_selection();
        assert_eq!(view.selection(), None);

        view.set_name("doc.md");
        view.set_gutter(true);
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);
        assert!(row(&buf, 2).starts_with("doc.md"));
    }

    #[test]
    fn links_are_selected_in_order() {
        let (mut view, _) = view(DOC, 60, 10);
        assert!(view.select_next(Target::Link));
        assert_eq!(view.selected_destination(), Some("https://x.dev"));
        assert!(view.select_next(Target::Link));
        assert_eq!(view.selected_destination(), Some("#details"));
        assert!(!view.select_next(Target::Link));
        assert_eq!(view.selected_destination(), Some("#details"));
        assert!(view.select_previous(Target::Link));
        assert_eq!(view.selected_destination(), Some("https://x.dev"));
    }

    #[test]
    fn previous_without_selection_starts_from_the_end() {
        let (mut view, _) = view(DOC, 60, 10);
        assert!(view.select_previous(Target::Link));
        assert_eq!(view.selected_destination(), Some("#details"));
    }

    #[test]
    fn selected_links_are_reversed() {
        let (mut view, _) = view("see [docs](x)\n", 20, 2);
        view.select_next(Target::Link);
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);
        let reversed: String = (0..20)
            .filter(|x| {
                buf.cell((*x, 0))
                    .unwrap()
                    .modifier
                    .contains(Modifier::REVERSED)
            })
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(reversed, "docs");
    }

    #[test]
    fn headings_are_selected_without_highlight() {
        let (mut view, _) = view(DOC, 60, 10);
        assert!(view.select_next(Target::Heading));
        assert!(view.select_next(Target::Heading));
        assert!(!view.selection.unwrap().highlight);
        assert_eq!(view.selected_destination(), None);
    }

    #[test]
    fn following_anchors_jumps_to_the_heading() {
        let (mut view, _) = view(DOC, 60, 3);
        view.select_next(Target::Link);
        assert_eq!(view.follow(), ViewAction::Open("https://x.dev".into()));
        view.select_next(Target::Link);
        assert_eq!(view.follow(), ViewAction::Redraw);
        let heading = view.selection_range().unwrap();
        let layout = view.layout.as_ref().unwrap();
        assert_eq!(&layout.output[heading.clone()], "## Details");
        assert_eq!(view.state.y as usize, layout.line_of(heading.start));
    }

    #[test]
    fn keys_drive_navigation_and_scrolling() {
        let (mut view, _) = view(DOC, 60, 3);
        assert_eq!(
            view.handle_event_action(InputEvent::Key(key_char(']'))),
            ViewAction::Redraw
        );
        assert!(view.selection().is_some());
        assert_eq!(
            view.handle_event_action(InputEvent::Key(key(KeyCode::Esc))),
            ViewAction::Redraw
        );
        assert_eq!(view.selection(), None);
        let y = view.state.y;
        assert_eq!(
            view.handle_event_action(InputEvent::Key(key_char('j'))),
            ViewAction::Redraw
        );
        assert_eq!(view.state.y, y + 1);
        assert_eq!(
            view.handle_event_action(InputEvent::Key(key_char('x'))),
            ViewAction::None
        );
    }

    #[test]
    fn selection_survives_a_resize() {
        let (mut view, _) = view(DOC, 60, 10);
        view.select_next(Target::Link);
        let node = view.selection();
        let area = Rect::new(0, 0, 12, 10);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);
        assert_eq!(view.selection(), node);
        assert_eq!(view.selected_destination(), Some("https://x.dev"));
    }

    #[test]
    fn gutter_truncates_the_name() {
        assert_eq!(
            gutter_text("doc.md", 20, 100),
            Some(("doc.md        ".to_string(), " 100% ".to_string()))
        );
        assert_eq!(
            gutter_text("a-very-long-name.md", 16, 7),
            Some(("a-very-...".to_string(), "   7% ".to_string()))
        );
        assert_eq!(gutter_text("doc.md", 8, 50).map(|g| g.0), Some("  ".to_string()));
        assert_eq!(gutter_text("doc.md", 3, 50), None);
    }

    #[test]
    fn gutter_is_drawn_on_the_last_row() {
        let mut view = MarkdownView::with_options(MarkdownViewOptions {
            theme: None,
            show_scrollbar: false,
            ..MarkdownViewOptions::default()
        });
        view.set_name("doc.md");
        view.set_markdown("hello\n");
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);
        assert_eq!(row(&buf, 2), "doc.md         100% ");
        assert!(row(&buf, 0).starts_with("hello"));
    }
}
