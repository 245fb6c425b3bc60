//! A typed, arena-backed Markdown tree built from `pulldown-cmark` offset events.
//!
//! `pulldown-cmark` produces a flat event stream; the renderer needs a tree with parent links,
//! sibling queries and a few source-derived facts the event stream does not carry directly:
//! whether a block follows a blank line, the whitespace it was indented by, how a heading or
//! fence was spelled, and which delimiter an emphasis run used. [`Document::parse`] recovers
//! those from the source buffer, which the document borrows for its whole lifetime.
use std::borrow::Cow;
use std::ops::Range;

use pulldown_cmark::Alignment as CmarkAlignment;
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::LinkType;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

/// How a link or image named its destination in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reference {
    /// `[text](dest "title")`
    Inline,
    /// `[text][label]`
    Full,
    /// `[text][]`
    Collapsed,
    /// `[text]`
    Shortcut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkData<'a> {
    pub reference: Reference,
    pub destination: Cow<'a, str>,
    pub title: Cow<'a, str>,
    pub label: Cow<'a, str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind<'a> {
    Document,
    Heading {
        level: u8,
        setext: bool,
    },
    Paragraph,
    /// Inline content of a tight list item.
    TextBlock,
    Blockquote,
    CodeBlock {
        code: Cow<'a, str>,
    },
    FencedCodeBlock {
        fence: &'a str,
        info: &'a str,
        code: Cow<'a, str>,
    },
    HtmlBlock {
        html: Cow<'a, str>,
    },
    LinkReferenceDefinition {
        label: &'a str,
    },
    List {
        ordered: bool,
        marker: u8,
        start: u64,
    },
    ListItem {
        content_offset: usize,
    },
    ThematicBreak,
    Table {
        alignments: Vec<Alignment>,
    },
    TableHeader,
    TableRow,
    TableCell,
    Text {
        text: &'a str,
        soft_break: bool,
        hard_break: bool,
    },
    Emphasis {
        marker: u8,
        level: u8,
    },
    Link(LinkData<'a>),
    Image(LinkData<'a>),
    AutoLink {
        label: &'a str,
        destination: Cow<'a, str>,
    },
    CodeSpan {
        backticks: usize,
        code: Cow<'a, str>,
    },
    RawHtml {
        html: Cow<'a, str>,
    },
    TaskMarker {
        checked: bool,
    },
    FootnoteReference {
        label: Cow<'a, str>,
    },
    FootnoteDefinition {
        label: Cow<'a, str>,
    },
}

impl NodeKind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Heading { .. } => "Heading",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::TextBlock => "TextBlock",
            NodeKind::Blockquote => "Blockquote",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::FencedCodeBlock { .. } => "FencedCodeBlock",
            NodeKind::HtmlBlock { .. } => "HtmlBlock",
            NodeKind::LinkReferenceDefinition { .. } => "LinkReferenceDefinition",
            NodeKind::List { .. } => "List",
            NodeKind::ListItem { .. } => "ListItem",
            NodeKind::ThematicBreak => "ThematicBreak",
            NodeKind::Table { .. } => "Table",
            NodeKind::TableHeader => "TableHeader",
            NodeKind::TableRow => "TableRow",
            NodeKind::TableCell => "TableCell",
            NodeKind::Text { .. } => "Text",
            NodeKind::Emphasis { .. } => "Emphasis",
            NodeKind::Link(_) => "Link",
            NodeKind::Image(_) => "Image",
            NodeKind::AutoLink { .. } => "AutoLink",
            NodeKind::CodeSpan { .. } => "CodeSpan",
            NodeKind::RawHtml { .. } => "RawHtml",
            NodeKind::TaskMarker { .. } => "TaskMarker",
            NodeKind::FootnoteReference { .. } => "FootnoteReference",
            NodeKind::FootnoteDefinition { .. } => "FootnoteDefinition",
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Heading { .. }
                | NodeKind::Paragraph
                | NodeKind::TextBlock
                | NodeKind::Blockquote
                | NodeKind::CodeBlock { .. }
                | NodeKind::FencedCodeBlock { .. }
                | NodeKind::HtmlBlock { .. }
                | NodeKind::LinkReferenceDefinition { .. }
                | NodeKind::List { .. }
                | NodeKind::ListItem { .. }
                | NodeKind::ThematicBreak
                | NodeKind::Table { .. }
                | NodeKind::TableHeader
                | NodeKind::TableRow
                | NodeKind::TableCell
                | NodeKind::FootnoteDefinition { .. }
        )
    }

    pub fn is_link(&self) -> bool {
        matches!(
            self,
            NodeKind::Link(_) | NodeKind::Image(_) | NodeKind::AutoLink { .. }
        )
    }

    /// The destination of a link, image or autolink.
    pub fn destination(&self) -> Option<&str> {
        match self {
            NodeKind::Link(link) | NodeKind::Image(link) => Some(&link.destination),
            NodeKind::AutoLink { destination, .. } => Some(destination),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    /// Source byte range.
    pub range: Range<usize>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// The line before this block is blank in the source.
    pub blank_previous_lines: bool,
    /// Indentation preceding a top-level block on its first line.
    pub leading_whitespace: Range<usize>,
}

#[derive(Clone, Debug)]
pub struct Document<'a> {
    source: &'a str,
    nodes: Vec<Node<'a>>,
}

impl<'a> Document<'a> {
    pub fn parse(source: &'a str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut builder = Builder::new(source);
        let mut events = Parser::new_ext(source, options).into_offset_iter();
        for (event, range) in events.by_ref() {
            builder.event(event, range);
        }

        let mut definitions: Vec<(&'a str, Range<usize>)> = events
            .reference_definitions()
            .iter()
            .filter_map(|(_, def)| {
                let span = def.span.clone();
                let label = source.get(span.clone())?;
                let label = label.split_once("]:")?.0.trim_start().trim_start_matches('[');
                Some((label, span))
            })
            .collect();
        definitions.sort_by_key(|(_, span)| span.start);

        let mut doc = builder.finish();
        for (label, span) in definitions {
            doc.insert_definition(label, span);
        }
        doc
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1 && self.nodes[0].children.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind<'a> {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|c| *c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// The node and all its descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_, 'a> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// The concatenated text content of a node, without markup.
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(id) {
            match self.kind(n) {
                NodeKind::Text {
                    text,
                    soft_break,
                    hard_break,
                } => {
                    out.push_str(text);
                    if *soft_break || *hard_break {
                        out.push(' ');
                    }
                }
                NodeKind::CodeSpan { code, .. } => out.push_str(code),
                NodeKind::AutoLink { label, .. } => out.push_str(label),
                _ => {}
            }
        }
        out
    }

    fn insert_definition(&mut self, label: &'a str, mut span: Range<usize>) {
        while span.end > span.start && self.source.as_bytes()[span.end - 1] == b'\n' {
            span.end -= 1;
        }

        let mut container = self.root();
        'descend: loop {
            for &child in self.children(container) {
                let node = self.node(child);
                let is_container = matches!(
                    node.kind,
                    NodeKind::Blockquote
                        | NodeKind::List { .. }
                        | NodeKind::ListItem { .. }
                        | NodeKind::FootnoteDefinition { .. }
                );
                if is_container && node.range.contains(&span.start) {
                    container = child;
                    continue 'descend;
                }
            }
            break;
        }
        if matches!(self.kind(container), NodeKind::List { .. }) {
            return;
        }

        let id = NodeId(self.nodes.len());
        let blank = follows_blank_line(self.source, span.start);
        self.nodes.push(Node {
            kind: NodeKind::LinkReferenceDefinition { label },
            range: span.clone(),
            parent: Some(container),
            children: Vec::new(),
            blank_previous_lines: blank,
            leading_whitespace: 0..0,
        });
        let pos = self
            .children(container)
            .iter()
            .position(|c| self.nodes[c.0].range.start > span.start)
            .unwrap_or(self.children(container).len());
        self.nodes[container.0].children.insert(pos, id);
    }
}

pub struct Descendants<'d, 'a> {
    doc: &'d Document<'a>,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

enum Frame {
    Node(NodeId),
    /// A `TextBlock` opened for the loose inline content of a tight list item.
    Implicit(NodeId),
    /// A tag the tree does not model; its contents attach to the enclosing node.
    Transparent,
}

struct Builder<'a> {
    source: &'a str,
    nodes: Vec<Node<'a>>,
    stack: Vec<Frame>,
}

impl<'a> Builder<'a> {
    fn new(source: &'a str) -> Self {
        let root = Node {
            kind: NodeKind::Document,
            range: 0..source.len(),
            parent: None,
            children: Vec::new(),
            blank_previous_lines: false,
            leading_whitespace: 0..0,
        };
        Self {
            source,
            nodes: vec![root],
            stack: vec![Frame::Node(NodeId(0))],
        }
    }

    fn finish(mut self) -> Document<'a> {
        while self.stack.len() > 1 {
            self.pop();
        }
        Document {
            source: self.source,
            nodes: self.nodes,
        }
    }

    fn container(&self) -> NodeId {
        self.stack
            .iter()
            .rev()
            .find_map(|f| match f {
                Frame::Node(id) | Frame::Implicit(id) => Some(*id),
                Frame::Transparent => None,
            })
            .unwrap_or(NodeId(0))
    }

    fn container_kind(&self) -> &NodeKind<'a> {
        &self.nodes[self.container().0].kind
    }

    fn add(&mut self, kind: NodeKind<'a>, range: Range<usize>) -> NodeId {
        let parent = self.container();
        let block = kind.is_block();
        let id = NodeId(self.nodes.len());
        let (blank, leading) = if block {
            (
                follows_blank_line(self.source, range.start),
                self.leading_whitespace(parent, &kind, range.start),
            )
        } else {
            (false, 0..0)
        };
        self.nodes.push(Node {
            kind,
            range,
            parent: Some(parent),
            children: Vec::new(),
            blank_previous_lines: blank,
            leading_whitespace: leading,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn open(&mut self, kind: NodeKind<'a>, range: Range<usize>) {
        let id = self.add(kind, range);
        self.stack.push(Frame::Node(id));
    }

    fn pop(&mut self) {
        if let Some(Frame::Implicit(id)) = self.stack.pop() {
            self.close_text_block(id);
        }
    }

    fn close_text_block(&mut self, id: NodeId) {
        if let Some(last) = self.nodes[id.0].children.last() {
            let end = self.nodes[last.0].range.end;
            self.nodes[id.0].range.end = end;
        }
    }

    fn end_implicit(&mut self) {
        if let Some(Frame::Implicit(id)) = self.stack.last() {
            let id = *id;
            self.close_text_block(id);
            self.stack.pop();
        }
    }

    /// Adds an inline node, wrapping loose list-item content in a `TextBlock`.
    fn inline(&mut self, kind: NodeKind<'a>, range: Range<usize>) -> NodeId {
        if matches!(
            self.container_kind(),
            NodeKind::ListItem { .. } | NodeKind::FootnoteDefinition { .. }
        ) {
            let start = range.start;
            let id = self.add(NodeKind::TextBlock, start..start);
            self.nodes[id.0].blank_previous_lines = false;
            self.nodes[id.0].leading_whitespace = 0..0;
            self.stack.push(Frame::Implicit(id));
        }
        self.add(kind, range)
    }

    fn text_node(&self, range: &Range<usize>) -> &'a str {
        self.source.get(range.clone()).unwrap_or("")
    }

    /// The parser starts the text of an escaped character after its backslash; take the
    /// backslash back so the escape survives rendering.
    fn escaped_range(&self, range: Range<usize>) -> Range<usize> {
        let bytes = self.source.as_bytes();
        let starts_with_punct = bytes
            .get(range.start)
            .is_some_and(|b| b.is_ascii_punctuation());
        let backslashes = bytes[..range.start.min(bytes.len())]
            .iter()
            .rev()
            .take_while(|b| **b == b'\\')
            .count();
        if starts_with_punct && backslashes % 2 == 1 {
            range.start - 1..range.end
        } else {
            range
        }
    }

    fn event(&mut self, event: Event<'a>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(_) => {
                self.end_implicit();
                self.pop();
            }
            Event::Text(text) => {
                let container = self.container();
                match &mut self.nodes[container.0].kind {
                    NodeKind::CodeBlock { code } | NodeKind::FencedCodeBlock { code, .. } => {
                        append(code, text);
                    }
                    NodeKind::HtmlBlock { html } => append(html, text),
                    NodeKind::AutoLink { .. } => {}
                    _ => {
                        let range = self.escaped_range(range);
                        let text = self.text_node(&range);
                        self.inline(
                            NodeKind::Text {
                                text,
                                soft_break: false,
                                hard_break: false,
                            },
                            range,
                        );
                    }
                }
            }
            Event::Code(code) => {
                let backticks = self
                    .text_node(&range)
                    .bytes()
                    .take_while(|b| *b == b'`')
                    .count()
                    .max(1);
                self.inline(
                    NodeKind::CodeSpan {
                        backticks,
                        code: cow(code),
                    },
                    range,
                );
            }
            Event::Html(html) => {
                let container = self.container();
                match &mut self.nodes[container.0].kind {
                    NodeKind::HtmlBlock { html: block } => append(block, html),
                    _ => {
                        self.inline(NodeKind::RawHtml { html: cow(html) }, range);
                    }
                }
            }
            Event::InlineHtml(html) => {
                self.inline(NodeKind::RawHtml { html: cow(html) }, range);
            }
            Event::FootnoteReference(label) => {
                self.inline(NodeKind::FootnoteReference { label: cow(label) }, range);
            }
            Event::SoftBreak => self.line_break(range, false),
            Event::HardBreak => self.line_break(range, true),
            Event::Rule => {
                self.end_implicit();
                self.add(NodeKind::ThematicBreak, range);
            }
            Event::TaskListMarker(checked) => {
                self.inline(NodeKind::TaskMarker { checked }, range);
            }
            Event::InlineMath(math) => {
                let text = self.text_node(&range);
                let text = if text.is_empty() { cow(math) } else { Cow::Borrowed(text) };
                self.inline(NodeKind::RawHtml { html: text }, range);
            }
            Event::DisplayMath(math) => {
                let text = self.text_node(&range);
                let text = if text.is_empty() { cow(math) } else { Cow::Borrowed(text) };
                self.inline(NodeKind::RawHtml { html: text }, range);
            }
        }
    }

    /// Soft and hard breaks become flags on the text that precedes them.
    fn line_break(&mut self, range: Range<usize>, hard: bool) {
        let container = self.container();
        if let Some(last) = self.nodes[container.0].children.last().copied()
            && let NodeKind::Text {
                soft_break,
                hard_break,
                ..
            } = &mut self.nodes[last.0].kind
            && !*soft_break
            && !*hard_break
        {
            if hard {
                *hard_break = true;
            } else {
                *soft_break = true;
            }
            self.nodes[last.0].range.end = range.end;
            return;
        }
        self.inline(
            NodeKind::Text {
                text: "",
                soft_break: !hard,
                hard_break: hard,
            },
            range,
        );
    }

    fn start(&mut self, tag: Tag<'a>, range: Range<usize>) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => {
                let setext = !self.text_node(&range).trim_start().starts_with('#');
                NodeKind::Heading {
                    level: heading_level(level),
                    setext,
                }
            }
            Tag::BlockQuote(_) => NodeKind::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Indented) => NodeKind::CodeBlock {
                code: Cow::Borrowed(""),
            },
            Tag::CodeBlock(CodeBlockKind::Fenced(_)) => {
                let src = self.text_node(&range).trim_start();
                let first = src.as_bytes().first().copied().unwrap_or(b'`');
                let fence_len = src.bytes().take_while(|b| *b == first).count();
                let (fence, rest) = src.split_at(fence_len);
                let info = rest.lines().next().unwrap_or("").trim();
                NodeKind::FencedCodeBlock {
                    fence,
                    info,
                    code: Cow::Borrowed(""),
                }
            }
            Tag::HtmlBlock => NodeKind::HtmlBlock {
                html: Cow::Borrowed(""),
            },
            Tag::List(start) => {
                let src = self.text_node(&range).trim_start();
                let marker = match start {
                    Some(_) => src
                        .bytes()
                        .find(|b| !b.is_ascii_digit())
                        .unwrap_or(b'.'),
                    None => src.bytes().next().unwrap_or(b'-'),
                };
                NodeKind::List {
                    ordered: start.is_some(),
                    marker,
                    start: start.unwrap_or(1),
                }
            }
            Tag::Item => NodeKind::ListItem {
                content_offset: self.content_offset(range.start),
            },
            Tag::FootnoteDefinition(label) => NodeKind::FootnoteDefinition { label: cow(label) },
            Tag::Table(alignments) => NodeKind::Table {
                alignments: alignments.into_iter().map(alignment).collect(),
            },
            Tag::TableHead => NodeKind::TableHeader,
            Tag::TableRow => NodeKind::TableRow,
            Tag::TableCell => NodeKind::TableCell,
            Tag::Emphasis => NodeKind::Emphasis {
                marker: self.delimiter(&range, b'*'),
                level: 1,
            },
            Tag::Strong => NodeKind::Emphasis {
                marker: self.delimiter(&range, b'*'),
                level: 2,
            },
            Tag::Strikethrough => {
                let level = self
                    .text_node(&range)
                    .bytes()
                    .take_while(|b| *b == b'~')
                    .count()
                    .clamp(1, 2) as u8;
                NodeKind::Emphasis { marker: b'~', level }
            }
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => match link_type {
                LinkType::Autolink | LinkType::Email => {
                    let src = self.text_node(&range);
                    let label = src
                        .strip_prefix('<')
                        .and_then(|s| s.strip_suffix('>'))
                        .unwrap_or(src);
                    NodeKind::AutoLink {
                        label,
                        destination: cow(dest_url),
                    }
                }
                _ => NodeKind::Link(link_data(link_type, dest_url, title, id)),
            },
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => NodeKind::Image(link_data(link_type, dest_url, title, id)),
            _ => {
                self.stack.push(Frame::Transparent);
                return;
            }
        };

        if kind.is_block() {
            self.end_implicit();
            self.open(kind, range);
        } else {
            let id = self.inline(kind, range);
            self.stack.push(Frame::Node(id));
        }
    }

    fn delimiter(&self, range: &Range<usize>, default: u8) -> u8 {
        match self.text_node(range).bytes().next() {
            Some(b @ (b'*' | b'_')) => b,
            _ => default,
        }
    }

    /// Column at which the content of the list item starting at `start` begins, relative to the
    /// marker (plus any recorded top-level indentation).
    fn content_offset(&self, start: usize) -> usize {
        let line_start = line_start(self.source, start);
        let line = &self.source[line_start..];
        let line = line.split('\n').next().unwrap_or("");
        let rel = start - line_start;
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        let marker_at = rel.max(indent).min(line.len());
        let after = &line[marker_at..];
        let marker_len = match after.bytes().position(|b| !b.is_ascii_digit()) {
            Some(0) | None => 1,
            Some(digits) => digits + 1,
        }
        .min(after.len());
        let rest = after[marker_len..].trim_end_matches('\r');
        let spaces = rest.len() - rest.trim_start_matches(' ').len();
        let spaces = if spaces == 0 || spaces > 4 || spaces == rest.len() {
            1
        } else {
            spaces
        };
        let ws = if self.top_level_item() { marker_at } else { 0 };
        ws + marker_len + spaces
    }

    fn top_level_item(&self) -> bool {
        let list = self.container();
        matches!(self.nodes[list.0].kind, NodeKind::List { .. })
            && self.nodes[list.0].parent == Some(NodeId(0))
    }

    fn leading_whitespace(
        &self,
        parent: NodeId,
        kind: &NodeKind<'a>,
        start: usize,
    ) -> Range<usize> {
        let eligible = match kind {
            NodeKind::CodeBlock { .. } | NodeKind::HtmlBlock { .. } | NodeKind::List { .. } => {
                false
            }
            NodeKind::ListItem { .. } => self.top_level_item(),
            _ => parent == NodeId(0),
        };
        if !eligible {
            return start..start;
        }
        let line_start = line_start(self.source, start);
        let bytes = self.source.as_bytes();
        if !bytes[line_start..start].iter().all(|b| *b == b' ' || *b == b'\t') {
            return start..start;
        }
        let end = bytes[line_start..]
            .iter()
            .position(|b| *b != b' ' && *b != b'\t')
            .map_or(self.source.len(), |p| line_start + p);
        line_start..end
    }
}

fn line_start(source: &str, pos: usize) -> usize {
    source[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// The line before the one containing `pos` holds nothing but whitespace and quote markers.
fn follows_blank_line(source: &str, pos: usize) -> bool {
    let start = line_start(source, pos);
    if start == 0 {
        return false;
    }
    let prev = &source[..start - 1];
    let prev_line = &prev[line_start(prev, prev.len())..];
    prev_line
        .trim_matches(|c: char| c == ' ' || c == '\t' || c == '\r' || c == '>')
        .is_empty()
}

fn cow(s: CowStr<'_>) -> Cow<'_, str> {
    match s {
        CowStr::Borrowed(b) => Cow::Borrowed(b),
        other => Cow::Owned(other.into_string()),
    }
}

fn append<'a>(target: &mut Cow<'a, str>, text: CowStr<'a>) {
    if target.is_empty() {
        *target = cow(text);
    } else {
        target.to_mut().push_str(&text);
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn alignment(a: CmarkAlignment) -> Alignment {
    match a {
        CmarkAlignment::None => Alignment::None,
        CmarkAlignment::Left => Alignment::Left,
        CmarkAlignment::Center => Alignment::Center,
        CmarkAlignment::Right => Alignment::Right,
    }
}

fn link_data<'a>(
    link_type: LinkType,
    destination: CowStr<'a>,
    title: CowStr<'a>,
    id: CowStr<'a>,
) -> LinkData<'a> {
    let reference = match link_type {
        LinkType::Reference | LinkType::ReferenceUnknown => Reference::Full,
        LinkType::Collapsed | LinkType::CollapsedUnknown => Reference::Collapsed,
        LinkType::Shortcut | LinkType::ShortcutUnknown => Reference::Shortcut,
        _ => Reference::Inline,
    };
    LinkData {
        reference,
        destination: cow(destination),
        title: cow(title),
        label: cow(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(doc: &Document<'_>) -> Vec<String> {
        fn go(doc: &Document<'_>, id: NodeId, depth: usize, out: &mut Vec<String>) {
            out.push(format!("{}{}", "  ".repeat(depth), doc.kind(id).name()));
            for &c in doc.children(id) {
                go(doc, c, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        go(doc, doc.root(), 0, &mut out);
        out
    }

    #[test]
    fn builds_block_and_inline_structure() {
        let doc = Document::parse("# Title\n\nHello *world*.\n");
        assert_eq!(
            shape(&doc),
            vec![
                "Document",
                "  Heading",
                "    Text",
                "  Paragraph",
                "    Text",
                "    Emphasis",
                "      Text",
                "    Text",
            ]
        );
    }

    #[test]
    fn heading_spelling_is_recorded() {
        let doc = Document::parse("Title\n=====\n\n## Sub\n");
        let kinds: Vec<_> = doc
            .children(doc.root())
            .iter()
            .map(|c| doc.kind(*c).clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Heading {
                    level: 1,
                    setext: true
                },
                NodeKind::Heading {
                    level: 2,
                    setext: false
                },
            ]
        );
    }

    #[test]
    fn tight_items_get_a_text_block() {
        let doc = Document::parse("- a\n- b\n");
        assert_eq!(
            shape(&doc),
            vec![
                "Document",
                "  List",
                "    ListItem",
                "      TextBlock",
                "        Text",
                "    ListItem",
                "      TextBlock",
                "        Text",
            ]
        );
    }

    #[test]
    fn list_markers_come_from_the_source() {
        let doc = Document::parse("3) x\n4) y\n");
        let list = doc.children(doc.root())[0];
        assert_eq!(
            doc.kind(list),
            &NodeKind::List {
                ordered: true,
                marker: b')',
                start: 3
            }
        );
        let item = doc.children(list)[0];
        assert_eq!(doc.kind(item), &NodeKind::ListItem { content_offset: 3 });
    }

    #[test]
    fn wide_item_offset_is_kept() {
        let doc = Document::parse("-   wide\n");
        let item = doc.children(doc.children(doc.root())[0])[0];
        assert_eq!(doc.kind(item), &NodeKind::ListItem { content_offset: 4 });
    }

    #[test]
    fn breaks_attach_to_preceding_text() {
        let doc = Document::parse("one\ntwo  \nthree\n");
        let para = doc.children(doc.root())[0];
        let flags: Vec<_> = doc
            .children(para)
            .iter()
            .map(|c| match doc.kind(*c) {
                NodeKind::Text {
                    text,
                    soft_break,
                    hard_break,
                } => (*text, *soft_break, *hard_break),
                other => panic!("unexpected {}", other.name()),
            })
            .collect();
        assert_eq!(
            flags,
            vec![("one", true, false), ("two", false, true), ("three", false, false)]
        );
    }

    #[test]
    fn blank_previous_lines_follow_the_source() {
        let doc = Document::parse("a\n\nb\n> c\n>\n> d\n");
        let top = doc.children(doc.root());
        assert!(!doc.node(top[0]).blank_previous_lines);
        assert!(doc.node(top[1]).blank_previous_lines);
        let quote = top[2];
        let inner = doc.children(quote);
        assert!(doc.node(inner[1]).blank_previous_lines);
    }

    #[test]
    fn emphasis_and_code_spans_remember_their_delimiters() {
        let doc = Document::parse("__a__ _b_ ~~c~~ ``d`e``\n");
        let para = doc.children(doc.root())[0];
        let kinds: Vec<_> = doc
            .children(para)
            .iter()
            .filter_map(|c| match doc.kind(*c) {
                NodeKind::Emphasis { marker, level } => Some(format!("{}{level}", *marker as char)),
                NodeKind::CodeSpan { backticks, code } => Some(format!("{backticks}:{code}")),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["_2", "_1", "~2", "2:d`e"]);
    }

    #[test]
    fn links_record_their_reference_form() {
        let src = "[a](/x \"t\") [b][r] [r][] [r] <https://e.com>\n\n[r]: /y\n";
        let doc = Document::parse(src);
        let para = doc.children(doc.root())[0];
        let forms: Vec<_> = doc
            .children(para)
            .iter()
            .filter_map(|c| match doc.kind(*c) {
                NodeKind::Link(l) => Some(format!("{:?}", l.reference)),
                NodeKind::AutoLink { label, .. } => Some(format!("auto:{label}")),
                _ => None,
            })
            .collect();
        assert_eq!(
            forms,
            vec!["Inline", "Full", "Collapsed", "Shortcut", "auto:https://e.com"]
        );
        let defs: Vec<_> = doc
            .children(doc.root())
            .iter()
            .filter(|c| matches!(doc.kind(**c), NodeKind::LinkReferenceDefinition { .. }))
            .collect();
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn fenced_code_keeps_fence_and_info() {
        let doc = Document::parse("~~~~ rust extra\nfn x() {}\n~~~~\n");
        let code = doc.children(doc.root())[0];
        assert_eq!(
            doc.kind(code),
            &NodeKind::FencedCodeBlock {
                fence: "~~~~",
                info: "rust extra",
                code: Cow::Borrowed("fn x() {}\n"),
            }
        );
    }

    #[test]
    fn top_level_indentation_is_recorded() {
        let src = "  # Heading\n";
        let doc = Document::parse(src);
        let heading = doc.children(doc.root())[0];
        assert_eq!(&src[doc.node(heading).leading_whitespace.clone()], "  ");
    }

    #[test]
    fn plain_text_concatenates_inline_content() {
        let doc = Document::parse("## Hello `code` *world*\n");
        let heading = doc.children(doc.root())[0];
        assert_eq!(doc.plain_text(heading), "Hello code world");
    }

    #[test]
    fn escaped_characters_keep_their_backslash() {
        let doc = Document::parse("a \\*b\\* \\\\c\n");
        let para = doc.children(doc.root())[0];
        let text: String = doc
            .children(para)
            .iter()
            .map(|id| match doc.kind(*id) {
                NodeKind::Text { text, .. } => *text,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(text, "a \\*b\\* \\\\c");
    }
}
