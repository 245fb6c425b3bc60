//! Tables are drawn as a box-drawing grid sized from a measuring pass.
//!
//! [`measure`] renders every cell on its own into a [`ColumnCounter`], in the same row-major
//! order the drawing pass later visits them, so `cell_widths[i]` always belongs to the `i`th
//! cell drawn.
use std::io;
use std::io::Write;

use mdkit_core::measure::text_width;
use mdkit_core::theme::TokenClass;

use super::RenderState;
use super::Renderer;
use super::block::close_block;
use super::block::open_block;
use super::visit;
use super::visit_children;
use crate::ast::Alignment;
use crate::ast::Document;
use crate::ast::NodeId;

const VERTICAL: &str = "│";
const HORIZONTAL: &str = "─";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableLayout {
    /// Widest cell of each column.
    pub column_widths: Vec<usize>,
    /// Width of every cell, header first, row-major.
    pub cell_widths: Vec<usize>,
}

/// Progress through the table currently being drawn.
#[derive(Clone, Debug, Default)]
pub struct TableState {
    pub layout: TableLayout,
    pub alignments: Vec<Alignment>,
    /// `0` is the header row.
    pub row: usize,
    pub col: usize,
    pub cell: usize,
    /// Cells render bare, without borders, padding or styles.
    pub measuring: bool,
}

impl TableState {
    fn measuring() -> Self {
        Self {
            measuring: true,
            ..Self::default()
        }
    }
}

/// An `io::Write` sink that keeps nothing but the display width of what passes through it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColumnCounter {
    pub columns: usize,
}

impl Write for ColumnCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.columns += text_width(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Measures every cell of `table` with the same renderer settings, minus wrapping.
pub fn measure(renderer: &Renderer, doc: &Document<'_>, table: NodeId) -> io::Result<TableLayout> {
    let mut layout = TableLayout::default();
    for &row in doc.children(table) {
        for (col, &cell) in doc.children(row).iter().enumerate() {
            let mut sub = RenderState::new(renderer, ColumnCounter::default(), 0, false);
            sub.tables.push(TableState::measuring());
            visit(&mut sub, doc, cell)?;
            sub.writer.flush()?;
            let width = sub.writer.get_ref().columns;

            if layout.column_widths.len() <= col {
                layout.column_widths.resize(col + 1, 0);
            }
            layout.column_widths[col] = layout.column_widths[col].max(width);
            layout.cell_widths.push(width);
        }
    }
    Ok(layout)
}

fn current<'s, W: Write>(st: &'s mut RenderState<'_, W>) -> &'s mut TableState {
    let Some(table) = st.tables.last_mut() else {
        panic!("table part outside of a table");
    };
    table
}

fn border<W: Write>(
    st: &mut RenderState<'_, W>,
    left: char,
    join: char,
    right: char,
) -> io::Result<()> {
    let table = current(st);
    let mut line = String::new();
    line.push(left);
    for (i, width) in table.layout.column_widths.iter().enumerate() {
        if i > 0 {
            line.push(join);
        }
        line.push_str(&HORIZONTAL.repeat(*width));
    }
    line.push(right);
    line.push('\n');
    st.write(&line)
}

pub(crate) fn table<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
    alignments: &[Alignment],
) -> io::Result<()> {
    open_block(st, doc, id)?;
    st.writer.push_wrap(false);

    let layout = measure(st.renderer, doc, id)?;
    tracing::trace!(
        columns = layout.column_widths.len(),
        cells = layout.cell_widths.len(),
        "measured table"
    );
    st.tables.push(TableState {
        layout,
        alignments: alignments.to_vec(),
        ..TableState::default()
    });

    visit_children(st, doc, id)?;
    border(st, '╰', '┴', '╯')?;

    st.tables.pop();
    st.writer.pop_wrap();
    close_block(st, id)
}

pub(crate) fn header<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    st.open_span(id);
    border(st, '╭', '┬', '╮')?;
    st.write(VERTICAL)?;
    visit_children(st, doc, id)?;
    st.write(VERTICAL)?;
    st.write("\n")?;
    border(st, '├', '┼', '┤')?;
    let table = current(st);
    table.col = 0;
    table.row += 1;
    st.close_span();
    Ok(())
}

pub(crate) fn row<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    st.open_span(id);
    st.write(VERTICAL)?;
    visit_children(st, doc, id)?;
    st.write(VERTICAL)?;
    st.write("\n")?;
    let table = current(st);
    table.col = 0;
    table.row += 1;
    st.close_span();
    Ok(())
}

pub(crate) fn cell<W: Write>(
    st: &mut RenderState<'_, W>,
    doc: &Document<'_>,
    id: NodeId,
) -> io::Result<()> {
    st.open_span(id);
    let table = current(st);
    let (measuring, row, col) = (table.measuring, table.row, table.col);
    if measuring {
        visit_children(st, doc, id)?;
        st.close_span();
        return Ok(());
    }

    // Header separators sit outside the cell style, body separators inside it.
    if row == 0 && col > 0 {
        st.write(VERTICAL)?;
    }
    st.push_style(match row {
        0 => TokenClass::TableHeader,
        r if r % 2 == 0 => TokenClass::TableRowAlt,
        _ => TokenClass::TableRow,
    })?;
    if row != 0 && col > 0 {
        st.write(VERTICAL)?;
    }

    visit_children(st, doc, id)?;

    let table = current(st);
    let column_width = table.layout.column_widths.get(col).copied().unwrap_or(0);
    let cell_width = table.layout.cell_widths.get(table.cell).copied().unwrap_or(0);
    table.col += 1;
    table.cell += 1;
    let fill = column_width.saturating_sub(cell_width);
    if fill > 0 {
        st.write(&" ".repeat(fill))?;
    }
    st.pop_style()?;
    st.close_span();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RendererOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn measures_every_cell_in_row_major_order() {
        let doc = Document::parse("| a | bb |\n|---|---|\n| ccc | d |\n");
        let table = doc.children(doc.root())[0];
        let layout = measure(&Renderer::default(), &doc, table).unwrap();
        assert_eq!(layout.column_widths, vec![3, 2]);
        assert_eq!(layout.cell_widths, vec![1, 2, 3, 1]);
    }

    #[test]
    fn styled_cells_measure_in_columns() {
        let options = RendererOptions {
            theme: Some(mdkit_core::theme::Theme::pulumi()),
            ..RendererOptions::default()
        };
        let doc = Document::parse("| **x** | `y` |\n|---|---|\n");
        let table = doc.children(doc.root())[0];
        let layout = measure(&Renderer::new(options), &doc, table).unwrap();
        assert_eq!(layout.cell_widths, vec![5, 3]);
    }

    #[test]
    fn counter_ignores_escapes() {
        let mut counter = ColumnCounter::default();
        counter.write_all("\x1b[1mhé\x1b[0m".as_bytes()).unwrap();
        assert_eq!(counter.columns, 2);
    }
}
