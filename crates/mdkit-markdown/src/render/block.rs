use std::io;
use std::io::Write;

use mdkit_core::theme::TokenClass;

use super::ListState;
use super::RenderState;
use super::visit_children;
use crate::ast::Document;
use crate::ast::NodeId;
use crate::ast::NodeKind;

/// A block gets an empty line before it when its source had one, unless it opens a document,
/// a list item, or a parent that already wrote its own empty line.
pub(crate) fn blank_before(doc: &Document<'_>, id: NodeId) -> bool {
    let node = doc.node(id);
    if !node.blank_previous_lines {
        return false;
    }
    let Some(parent) = node.parent else {
        return false;
    };
    if doc.first_child(parent) != Some(id) {
        return true;
    }
    let parent = doc.node(parent);
    !(matches!(parent.kind, NodeKind::Document | NodeKind::ListItem { .. })
        || parent.blank_previous_lines)
}

pub(crate) fn open_block<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    st.open_span(id);
    st.blocks.push(id);
    if blank_before(doc, id) {
        st.write("\n")?;
    }
    let leading = doc.node(id).leading_whitespace.clone();
    if !leading.is_empty() {
        st.write(&doc.source()[leading])?;
    }
    Ok(())
}

pub(crate) fn close_block<W: Write>(st: &mut RenderState<'_, W>, id: NodeId) -> io::Result<()> {
    st.writer.flush_word()?;
    if !st.writer.at_newline() {
        st.write("\n")?;
    }
    let open = st.blocks.pop();
    assert_eq!(open, Some(id), "close_block for a block that is not open");
    st.close_span();
    Ok(())
}

pub(crate) fn heading<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    level: u8,
    setext: bool,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.writer.push_wrap(false);
    st.push_style(if level <= 2 {
        TokenClass::GenericHeading
    } else {
        TokenClass::GenericSubheading
    })?;
    if !setext {
        st.write(&"#".repeat(usize::from(level)))?;
        st.write(" ")?;
    }
    visit_children(st, doc, id)?;
    if setext {
        if !st.writer.at_newline() {
            st.write("\n")?;
        }
        st.write(if level == 1 { "===" } else { "---" })?;
    }
    st.pop_style()?;
    st.write("\n")?;
    st.writer.pop_wrap();
    close_block(st, id)
}

pub(crate) fn paragraph<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    // Adjacent paragraphs with no empty line between them in the source still need one in the
    // output, or they would read back as a single paragraph.
    if !doc.node(id).blank_previous_lines
        && let Some(prev) = doc.previous_sibling(id)
        && matches!(doc.kind(prev), NodeKind::Paragraph | NodeKind::Blockquote)
    {
        st.write("\n")?;
    }
    open_block(st, doc, id)?;
    st.writer.push_wrap(true);
    visit_children(st, doc, id)?;
    st.writer.pop_wrap();
    close_block(st, id)
}

pub(crate) fn text_block<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.writer.push_wrap(true);
    visit_children(st, doc, id)?;
    st.writer.pop_wrap();
    close_block(st, id)
}

pub(crate) fn blockquote<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.push_style(TokenClass::GenericEmph)?;
    st.write("> ")?;
    st.writer.push_prefix("> ");
    visit_children(st, doc, id)?;
    st.writer.pop_prefix();
    st.pop_style()?;
    close_block(st, id)
}

/// Indented code is always re-indented by four columns, whatever the source used.
pub(crate) fn code_block<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    code: &str,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.writer.push_wrap(false);
    st.write("    ")?;
    st.writer.push_indent(4);
    st.write_code(None, code)?;
    st.writer.pop_prefix();
    st.writer.pop_wrap();
    close_block(st, id)
}

pub(crate) fn fenced_code_block<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    fence: &str,
    info: &str,
    code: &str,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.writer.push_wrap(false);
    st.push_style(TokenClass::LiteralStringHeredoc)?;
    st.write(fence)?;
    st.write(info)?;
    st.write("\n")?;
    st.write_code(info.split_whitespace().next(), code)?;
    if !st.writer.at_newline() {
        st.write("\n")?;
    }
    st.write(fence)?;
    st.pop_style()?;
    st.write("\n")?;
    st.writer.pop_wrap();
    close_block(st, id)
}

pub(crate) fn html_block<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    html: &str,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.writer.push_wrap(false);
    st.write(html)?;
    st.writer.pop_wrap();
    close_block(st, id)
}

/// Definitions are written back from their source lines. Continuation lines lose the
/// indentation and quote markers of the enclosing blocks, which the prefix stack re-adds.
pub(crate) fn link_reference_definition<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.writer.push_wrap(true);
    let source = &doc.source()[doc.node(id).range.clone()];
    for (i, line) in source.trim_end().lines().enumerate() {
        let line = if i == 0 {
            line
        } else {
            line.trim_start_matches([' ', '\t', '>'])
        };
        st.write(line)?;
        st.write("\n")?;
    }
    st.writer.pop_wrap();
    close_block(st, id)
}

pub(crate) fn list<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    ordered: bool,
    marker: u8,
    start: u64,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.lists.push(ListState {
        marker,
        ordered,
        index: start,
    });
    visit_children(st, doc, id)?;
    st.lists.pop();
    close_block(st, id)
}

pub(crate) fn list_item<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    content_offset: usize,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    let Some(list) = st.lists.last_mut() else {
        panic!("list item outside of a list");
    };
    let marker = char::from(list.marker);
    let mut width = 2;
    if list.ordered {
        let number = list.index.to_string();
        list.index += 1;
        width += number.len();
        st.write(&number)?;
    }
    let mut lead = String::with_capacity(2);
    lead.push(marker);
    lead.push(' ');
    st.write(&lead)?;

    let offset = width + doc.node(id).leading_whitespace.len();
    if content_offset > offset {
        st.write(&" ".repeat(content_offset - offset))?;
    }
    st.writer.push_indent(offset.max(content_offset));
    visit_children(st, doc, id)?;
    st.writer.pop_prefix();
    close_block(st, id)
}

pub(crate) fn thematic_break<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.write("***\n")?;
    close_block(st, id)
}

pub(crate) fn footnote_definition<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    label: &str,
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.write("[^")?;
    st.write(label)?;
    st.write("]: ")?;
    st.writer.push_indent(4);
    visit_children(st, doc, id)?;
    st.writer.pop_prefix();
    close_block(st, id)
}
