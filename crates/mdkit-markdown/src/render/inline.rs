use std::borrow::Cow;
use std::io;
use std::io::Write;

use mdkit_core::sgr;
use mdkit_core::theme::StyleEntry;
use mdkit_core::theme::TokenClass;

use super::RenderState;
use super::image::render_image;
use super::visit_children;
use crate::ast::Document;
use crate::ast::LinkData;
use crate::ast::NodeId;
use crate::ast::Reference;

pub(crate) fn text<W: Write>(
    st: &mut RenderState<'_, W>,
    id: NodeId,
    text: &str,
    soft_break: bool,
    hard_break: bool,
) -> io::Result<()> {
    st.open_span(id);
    st.write(text)?;
    if hard_break {
        st.write("\\\n")?;
    } else if soft_break {
        st.write(if st.options().soft_break { " " } else { "\n" })?;
    }
    st.close_span();
    Ok(())
}

pub(crate) fn emphasis<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    marker: u8,
    level: u8,
) -> io::Result<()> {
    let delimiter = char::from(marker)
        .to_string()
        .repeat(usize::from(level));
    st.open_span(id);
    st.write(&delimiter)?;
    visit_children(st, doc, id)?;
    st.write(&delimiter)?;
    st.close_span();
    Ok(())
}

pub(crate) fn link<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    link: &LinkData<'_>,
) -> io::Result<()> {
    st.open_span(id);
    link_or_image(st, doc, id, "[", link)?;
    st.close_span();
    Ok(())
}

/// Images are drawn inline when enabled and reachable; anything else falls back to `![...]`.
/// Table cells always take the textual form so their measured width holds.
pub(crate) fn image<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    link: &LinkData<'_>,
) -> io::Result<()> {
    st.open_span(id);
    if st.options().images.enabled && st.tables.is_empty() {
        match render_image(st.options(), &link.destination) {
            Ok(frame) => {
                st.write("\n")?;
                frame.write_to(&mut st.writer)?;
                // Half-block rows end in a full reset.
                let top = st.styles.top();
                if !top.is_zero() {
                    st.write(&sgr::delta(&StyleEntry::default(), &top))?;
                }
                st.write("\n")?;
                st.close_span();
                return Ok(());
            }
            Err(error) => {
                tracing::debug!(location = %link.destination, %error, "image fallback to text");
            }
        }
    }
    link_or_image(st, doc, id, "![", link)?;
    st.close_span();
    Ok(())
}

fn link_or_image<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    open: &str,
    link: &LinkData<'_>,
) -> io::Result<()> {
    if st.options().hyperlinks {
        st.push_style(TokenClass::GenericUnderline)?;
        visit_children(st, doc, id)?;
        return st.pop_style();
    }

    st.write(open)?;
    visit_children(st, doc, id)?;
    match link.reference {
        Reference::Full => {
            st.write("][")?;
            st.write(&link.label)?;
            st.write("]")
        }
        Reference::Collapsed => st.write("][]"),
        Reference::Shortcut => st.write("]"),
        Reference::Inline => {
            st.write("](")?;
            st.write(&escape_destination(&link.destination))?;
            if !link.title.is_empty() {
                st.write(" ")?;
                st.write(&quote_title(&link.title))?;
            }
            st.write(")")
        }
    }
}

/// Wraps a destination in angle brackets when it holds whitespace, controls or parentheses.
pub(crate) fn escape_destination(dest: &str) -> Cow<'_, str> {
    let needs_escape = dest
        .bytes()
        .any(|b| b <= b' ' || b == b'(' || b == b')' || b == 0x7f);
    if !needs_escape {
        return Cow::Borrowed(dest);
    }
    let mut escaped = String::with_capacity(dest.len() + 2);
    escaped.push('<');
    for ch in dest.chars() {
        if ch == '<' || ch == '>' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('>');
    Cow::Owned(escaped)
}

/// Quotes a parsed title so it reads back unchanged: `'…'` when the title holds `"` but no
/// `'`, otherwise `"…"`. Backslashes and the chosen quote are escaped.
pub(crate) fn quote_title(title: &str) -> String {
    let delimiter = if title.contains('"') && !title.contains('\'') {
        '\''
    } else {
        '"'
    };
    let mut quoted = String::with_capacity(title.len() + 2);
    quoted.push(delimiter);
    for ch in title.chars() {
        if ch == '\\' || ch == delimiter {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push(delimiter);
    quoted
}

pub(crate) fn auto_link<W: Write>(
    st: &mut RenderState<'_, W>,
    id: NodeId,
    label: &str,
) -> io::Result<()> {
    st.open_span(id);
    st.write("<")?;
    st.write(label)?;
    st.write(">")?;
    st.close_span();
    Ok(())
}

/// Code spans get a space inside their backticks when the content would otherwise merge with
/// the delimiters or lose an edge space on re-parse.
fn pad_code_span(code: &str) -> bool {
    if code.is_empty() || code.bytes().all(|b| b == b' ') {
        return false;
    }
    let bytes = code.as_bytes();
    let edge = |b: u8| b == b'`' || b == b' ';
    edge(bytes[0]) || edge(bytes[bytes.len() - 1])
}

pub(crate) fn code_span<W: Write>(
    st: &mut RenderState<'_, W>,
    id: NodeId,
    backticks: usize,
    code: &str,
) -> io::Result<()> {
    st.open_span(id);
    st.writer.push_wrap(false);
    let delimiter = "`".repeat(backticks);
    let pad = pad_code_span(code);
    st.write(&delimiter)?;
    if pad {
        st.write(" ")?;
    }
    st.write_code(None, code)?;
    if pad {
        st.write(" ")?;
    }
    st.write(&delimiter)?;
    st.writer.pop_wrap();
    st.close_span();
    Ok(())
}

pub(crate) fn raw_html<W: Write>(
    st: &mut RenderState<'_, W>,
    id: NodeId,
    html: &str,
) -> io::Result<()> {
    st.open_span(id);
    st.writer.push_wrap(false);
    st.write(html)?;
    st.writer.pop_wrap();
    st.close_span();
    Ok(())
}

pub(crate) fn task_marker<W: Write>(
    st: &mut RenderState<'_, W>,
    id: NodeId,
    checked: bool,
) -> io::Result<()> {
    st.open_span(id);
    st.write(if checked { "[x] " } else { "[ ] " })?;
    st.close_span();
    Ok(())
}

pub(crate) fn footnote_reference<W: Write>(
    st: &mut RenderState<'_, W>,
    id: NodeId,
    label: &str,
) -> io::Result<()> {
    st.open_span(id);
    st.write("[^")?;
    st.write(label)?;
    st.write("]")?;
    st.close_span();
    Ok(())
}
