use mdkit_core::measure::strip_escapes;
use mdkit_core::measure::text_width;
use mdkit_markdown::ast::Document;
use mdkit_markdown::render::Renderer;
use mdkit_markdown::render::RendererOptions;
use pretty_assertions::assert_eq;

fn render(src: &str, width: usize, pad: bool) -> String {
    let doc = Document::parse(src);
    Renderer::new(RendererOptions {
        word_wrap: width,
        pad,
        ..RendererOptions::default()
    })
    .render_to_string(&doc)
    .unwrap()
    .0
}

fn words(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

#[test]
fn paragraph_wraps_at_ten_columns() {
    let src = "Hello world, this is a test of wrapping.\n";
    let out = render(src, 10, true);
    assert_eq!(
        out,
        "Hello     \nworld,    \nthis is a \ntest of   \nwrapping. \n"
    );
    for line in out.lines() {
        assert!(text_width(line) <= 10, "{line:?}");
    }
    assert_eq!(words(&out), words(src));
}

#[test]
fn lines_stay_within_the_width() {
    let src = "\
Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt
ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation.

- ullamco laboris nisi ut aliquip ex ea commodo consequat duis aute irure dolor
- in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur

> Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt.
";
    for width in [20, 33, 50] {
        let out = render(src, width, false);
        for line in out.lines() {
            assert!(text_width(line) <= width, "width {width}: {line:?}");
        }
        assert_eq!(words(&out).join(" ").replace("> ", ""), words(src).join(" ").replace("> ", ""));
    }
}

#[test]
fn quote_continuation_lines_repeat_the_marker() {
    let out = render("> one two three four five six\n", 12, true);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.len() > 1);
    for line in &lines {
        assert!(line.starts_with("> "), "{line:?}");
        assert_eq!(text_width(line), 12, "{line:?}");
    }
    let text: Vec<&str> = lines.iter().flat_map(|l| l[2..].split_whitespace()).collect();
    assert_eq!(text, vec!["one", "two", "three", "four", "five", "six"]);
}

#[test]
fn list_continuation_lines_indent_under_the_content() {
    let out = render("- alpha beta gamma delta\n", 12, false);
    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("- alpha "));
    for line in lines {
        assert!(line.starts_with("  "), "{line:?}");
        assert!(!line.starts_with("   "), "{line:?}");
    }
}

#[test]
fn overlong_words_are_never_split() {
    let out = render("a supercalifragilistic word\n", 8, false);
    assert!(out.lines().any(|l| l.trim() == "supercalifragilistic"));
}

#[test]
fn headings_and_code_are_not_wrapped() {
    let src = "# a heading that is long\n\n    code that is long too\n";
    assert_eq!(strip_escapes(&render(src, 10, false)), src);
}
