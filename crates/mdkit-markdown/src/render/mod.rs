//! Streaming Markdown-to-terminal renderer.
//!
//! [`Renderer::render`] walks a parsed [`Document`] once and writes Markdown source back out:
//! re-wrapped to a column budget, indented under its list items and quotes, and optionally
//! styled with SGR escapes from a [`Theme`]. Alongside the bytes it returns a [`SpanTree`]
//! that maps every node to the output range it produced.
//!
//! Per-call state lives in [`RenderState`], so a `Renderer` can be shared between threads and
//! reused for any number of documents.
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use mdkit_core::sgr::StyleStack;
use mdkit_core::text::CodeHighlighter;
use mdkit_core::theme::Theme;
use mdkit_core::theme::TokenClass;

use crate::ast::Document;
use crate::ast::NodeId;
use crate::ast::NodeKind;
use crate::error::RenderError;
use crate::span::SpanBuilder;
use crate::span::SpanTree;

mod block;
pub mod image;
mod inline;
pub mod table;
pub mod writer;

use self::table::TableState;
use self::writer::LineWriter;

/// Terminal size in cells and pixels. Zero means unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    pub columns: u16,
    pub rows: u16,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl Geometry {
    /// Pixel size of one cell, if both the cell and pixel dimensions are known.
    pub fn cell_size(&self) -> Option<(u32, u32)> {
        if self.columns == 0 || self.rows == 0 || self.pixel_width == 0 || self.pixel_height == 0 {
            return None;
        }
        Some((
            self.pixel_width / u32::from(self.columns),
            self.pixel_height / u32::from(self.rows),
        ))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageEncoderKind {
    /// Kitty graphics protocol: the PNG itself, framed in APC escapes.
    #[default]
    Kitty,
    /// Upper-half-block cells with 24-bit foreground and background colours.
    HalfBlock,
}

#[derive(Clone, Debug)]
pub struct ImageOptions {
    pub enabled: bool,
    /// Widest an image may be drawn, in columns.
    pub max_width: usize,
    /// Directory relative image locations are resolved against.
    pub content_root: PathBuf,
    pub encoder: ImageEncoderKind,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            max_width: 80,
            content_root: PathBuf::from("."),
            encoder: ImageEncoderKind::Kitty,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RendererOptions {
    /// Styles for each token class. `None` writes no escapes at all.
    pub theme: Option<Theme>,
    /// Wrap width in columns. `0` disables wrapping and padding.
    pub word_wrap: usize,
    /// Render soft line breaks as a single space instead of a newline.
    pub soft_break: bool,
    /// Show link text underlined and drop destinations instead of re-emitting link syntax.
    pub hyperlinks: bool,
    pub images: ImageOptions,
    /// Pad every line with spaces to the wrap width.
    pub pad: bool,
    pub geometry: Geometry,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            theme: None,
            word_wrap: 0,
            soft_break: false,
            hyperlinks: false,
            images: ImageOptions::default(),
            pad: true,
            geometry: Geometry::default(),
        }
    }
}

#[derive(Clone)]
pub struct Renderer {
    options: RendererOptions,
    highlighter: Option<Arc<dyn CodeHighlighter + Send + Sync>>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererOptions::default())
    }
}

impl Renderer {
    pub fn new(options: RendererOptions) -> Self {
        Self {
            options,
            highlighter: None,
        }
    }

    /// Tokenizes code blocks and code spans with `highlighter`. Tokens are only styled when a
    /// theme is set.
    pub fn with_highlighter(mut self, highlighter: Arc<dyn CodeHighlighter + Send + Sync>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RendererOptions {
        &mut self.options
    }

    /// Writes `doc` to `out` and returns the span of every rendered node.
    ///
    /// On error, whatever was written before the failure stays in `out`.
    pub fn render<W: Write>(&self, out: &mut W, doc: &Document<'_>) -> Result<SpanTree, RenderError> {
        let mut st = RenderState::new(self, out, self.options.word_wrap, self.options.pad);
        visit(&mut st, doc, doc.root())?;
        st.writer.flush()?;
        Ok(st.finish())
    }

    pub fn render_to_string(&self, doc: &Document<'_>) -> Result<(String, SpanTree), RenderError> {
        let mut out = Vec::new();
        let spans = self.render(&mut out, doc)?;
        let text = String::from_utf8(out)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        Ok((text, spans))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ListState {
    pub(crate) marker: u8,
    pub(crate) ordered: bool,
    pub(crate) index: u64,
}

/// Everything that changes during one walk of a document.
pub(crate) struct RenderState<'r, W: Write> {
    pub(crate) renderer: &'r Renderer,
    pub(crate) writer: LineWriter<W>,
    pub(crate) styles: StyleStack,
    pub(crate) spans: SpanBuilder,
    pub(crate) lists: Vec<ListState>,
    pub(crate) tables: Vec<TableState>,
    pub(crate) blocks: Vec<NodeId>,
}

impl<'r, W: Write> RenderState<'r, W> {
    pub(crate) fn new(renderer: &'r Renderer, out: W, width: usize, pad: bool) -> Self {
        Self {
            renderer,
            writer: LineWriter::new(out, width, pad),
            styles: StyleStack::new(renderer.options.theme.clone()),
            spans: SpanBuilder::new(),
            lists: Vec::new(),
            tables: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub(crate) fn options(&self) -> &'r RendererOptions {
        &self.renderer.options
    }

    pub(crate) fn write(&mut self, s: &str) -> io::Result<()> {
        self.writer.write_str(s)
    }

    pub(crate) fn push_style(&mut self, class: TokenClass) -> io::Result<()> {
        match self.styles.push(class) {
            Some(escape) => self.writer.write_str(&escape),
            None => Ok(()),
        }
    }

    pub(crate) fn pop_style(&mut self) -> io::Result<()> {
        match self.styles.pop() {
            Some(escape) => self.writer.write_str(&escape),
            None => Ok(()),
        }
    }

    pub(crate) fn open_span(&mut self, node: NodeId) {
        self.spans.open(node, self.writer.offset());
    }

    pub(crate) fn close_span(&mut self) {
        self.spans.close(self.writer.offset());
    }

    /// Writes `code`, styling each token when both a theme and a tokenizer are available.
    pub(crate) fn write_code(&mut self, language: Option<&str>, code: &str) -> io::Result<()> {
        if self.styles.theme().is_some()
            && let Some(highlighter) = &self.renderer.highlighter
            && let Some(tokens) = highlighter.tokenize(language, code)
        {
            for token in tokens {
                self.push_style(token.class)?;
                self.write(&token.text)?;
                self.pop_style()?;
            }
            return Ok(());
        }
        self.write(code)
    }

    fn finish(self) -> SpanTree {
        let writer = self.writer;
        self.spans
            .finish(|offset| writer.resolve(offset), |offset| writer.resolve_end(offset))
    }
}

pub(crate) fn visit<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    match doc.kind(id) {
        NodeKind::Document => document(st, doc, id),
        NodeKind::Heading { level, setext } => block::heading(st, doc, id, *level, *setext),
        NodeKind::Paragraph => block::paragraph(st, doc, id),
        NodeKind::TextBlock => block::text_block(st, doc, id),
        NodeKind::Blockquote => block::blockquote(st, doc, id),
        NodeKind::CodeBlock { code } => block::code_block(st, doc, id, code),
        NodeKind::FencedCodeBlock { fence, info, code } => {
            block::fenced_code_block(st, doc, id, fence, info, code)
        }
        NodeKind::HtmlBlock { html } => block::html_block(st, doc, id, html),
        NodeKind::LinkReferenceDefinition { .. } => block::link_reference_definition(st, doc, id),
        NodeKind::List {
            ordered,
            marker,
            start,
        } => block::list(st, doc, id, *ordered, *marker, *start),
        NodeKind::ListItem { content_offset } => block::list_item(st, doc, id, *content_offset),
        NodeKind::ThematicBreak => block::thematic_break(st, doc, id),
        NodeKind::FootnoteDefinition { label } => block::footnote_definition(st, doc, id, label),
        NodeKind::Table { alignments } => table::table(st, doc, id, alignments),
        NodeKind::TableHeader => table::header(st, doc, id),
        NodeKind::TableRow => table::row(st, doc, id),
        NodeKind::TableCell => table::cell(st, doc, id),
        NodeKind::Text {
            text,
            soft_break,
            hard_break,
        } => inline::text(st, id, text, *soft_break, *hard_break),
        NodeKind::Emphasis { marker, level } => inline::emphasis(st, doc, id, *marker, *level),
        NodeKind::Link(link) => inline::link(st, doc, id, link),
        NodeKind::Image(link) => inline::image(st, doc, id, link),
        NodeKind::AutoLink { label, .. } => inline::auto_link(st, id, label),
        NodeKind::CodeSpan { backticks, code } => inline::code_span(st, id, *backticks, code),
        NodeKind::RawHtml { html } => inline::raw_html(st, id, html),
        NodeKind::TaskMarker { checked } => inline::task_marker(st, id, *checked),
        NodeKind::FootnoteReference { label } => inline::footnote_reference(st, id, label),
    }
}

pub(crate) fn visit_children<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    for &child in doc.children(id) {
        visit(st, doc, child)?;
    }
    Ok(())
}

fn document<W: Write>(st: &mut RenderState<'_, W>, doc: &Document<'_>, id: NodeId) -> io::Result<()> {
    st.open_span(id);
    st.writer.push_wrap(true);
    st.push_style(TokenClass::Generic)?;
    visit_children(st, doc, id)?;
    st.pop_style()?;
    st.writer.pop_wrap();
    st.writer.flush_word()?;
    st.close_span();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(src: &str, options: RendererOptions) -> String {
        let doc = Document::parse(src);
        Renderer::new(options).render_to_string(&doc).unwrap().0
    }

    #[test]
    fn plain_document_round_trips() {
        let src = "# Title\n\nHello *world*.\n";
        assert_eq!(render(src, RendererOptions::default()), src);
    }

    #[test]
    fn themed_output_starts_and_ends_with_styles() {
        let options = RendererOptions {
            theme: Some(Theme::pulumi()),
            ..RendererOptions::default()
        };
        let out = render("text\n", options);
        assert!(out.contains("text"));
        assert!(out.ends_with("\x1b[0m"));
    }

    #[test]
    fn root_span_covers_everything() {
        let doc = Document::parse("a\n\n> b\n");
        let (text, spans) = Renderer::default().render_to_string(&doc).unwrap();
        let root = spans.get(spans.root());
        assert_eq!((root.start, root.end), (0, text.len()));
        assert_eq!(root.node, doc.root());
    }

    #[test]
    fn cell_size_needs_full_geometry() {
        let g = Geometry {
            columns: 80,
            rows: 24,
            pixel_width: 800,
            pixel_height: 480,
        };
        assert_eq!(g.cell_size(), Some((10, 20)));
        assert_eq!(Geometry::default().cell_size(), None);
    }
}
