use mdkit_core::measure::strip_escapes;
use mdkit_core::measure::text_width;
use mdkit_core::theme::Theme;
use mdkit_markdown::ast::Document;
use mdkit_markdown::render::Renderer;
use mdkit_markdown::render::RendererOptions;
use mdkit_markdown::render::table::measure;
use pretty_assertions::assert_eq;

fn render(src: &str, options: RendererOptions) -> String {
    let doc = Document::parse(src);
    Renderer::new(options).render_to_string(&doc).unwrap().0
}

const TABLE: &str = "| a | bb |\n|---|----|\n| ccc | d |\n";

#[test]
fn two_by_two_table_draws_a_uniform_grid() {
    let out = render(TABLE, RendererOptions::default());
    assert_eq!(
        out,
        "\
╭───┬──╮
│a  │bb│
├───┼──┤
│ccc│d │
╰───┴──╯
"
    );
}

#[test]
fn column_widths_are_the_widest_cell() {
    let doc = Document::parse(TABLE);
    let table = doc.children(doc.root())[0];
    let layout = measure(&Renderer::default(), &doc, table).unwrap();
    assert_eq!(layout.column_widths, vec![3, 2]);
}

#[test]
fn styled_tables_keep_their_borders_aligned() {
    let src = "| name | **value** |\n|---|---|\n| `x` | 1 |\n| y | [two](z) |\n";
    let out = render(
        src,
        RendererOptions {
            theme: Some(Theme::pulumi()),
            ..RendererOptions::default()
        },
    );
    let lines: Vec<String> = strip_escapes(&out).lines().map(str::to_owned).collect();
    assert_eq!(lines.len(), 6);
    let width = text_width(&lines[0]);
    for line in &lines {
        assert_eq!(text_width(line), width, "{line:?}");
    }
    let columns: Vec<usize> = lines[1]
        .char_indices()
        .filter(|(_, c)| *c == '│')
        .map(|(i, _)| lines[1][..i].chars().count())
        .collect();
    for line in &lines[1..lines.len() - 1] {
        if line.starts_with('├') {
            continue;
        }
        let here: Vec<usize> = line
            .char_indices()
            .filter(|(_, c)| *c == '│')
            .map(|(i, _)| line[..i].chars().count())
            .collect();
        assert_eq!(here, columns, "{line:?}");
    }
}

#[test]
fn tables_are_never_wrapped() {
    let out = render(
        "| a long header | another |\n|---|---|\n| x | y |\n",
        RendererOptions {
            word_wrap: 10,
            pad: false,
            ..RendererOptions::default()
        },
    );
    assert_eq!(out.lines().count(), 5);
    assert!(out.lines().next().unwrap().chars().count() > 10);
}

#[test]
fn wide_characters_measure_in_graphemes() {
    let out = render("| é | x |\n|---|---|\n| ab | y |\n", RendererOptions::default());
    assert!(out.contains("│é │x│"));
}
