//! Rendering without a theme writes Markdown that parses back into the same tree shape.
use mdkit_markdown::ast::Document;
use mdkit_markdown::render::Renderer;
use mdkit_markdown::render::RendererOptions;
use pretty_assertions::assert_eq;

const CORPUS: &[&str] = &[
    "# Title\n\nHello *world*.\n",
    "Setext\n======\n\nSub\n---\n",
    "a\\\nhard break\n",
    "soft\nbreak\n",
    "***strong emphasis*** and _under_ and ~~gone~~\n",
    "[inline](/a \"t\") [full][x] [collapsed][] [x]\n\n[x]: /b\n",
    "![alt](img.png) and <https://auto.link>\n",
    "`` a ` b `` and `plain`\n",
    "- a\n- b\n  - c\n    - d\n- e\n",
    "3. three\n4. four\n\n   more four\n",
    "- [ ] todo\n- [x] done\n",
    "> quote\n>\n> > nested\n",
    "> - list in quote\n>   continued\n",
    "    indented\n    code\n",
    "~~~python\nprint(1)\n~~~\n",
    "<div>\nhtml\n</div>\n\ntext\n",
    "para with <span>inline html</span>\n",
    "one[^n]\n\n[^n]: the note\n",
    "before\n\n---\n\nafter\n",
    "\\# not heading\n",
    "a \\*b\\* c\n",
    "1\\. not list\n",
    "\\[not link\\](x)\n",
    "[t](/x \"it's \\\"q\\\"\") and [u](/y 'say \"hi\"')\n",
    "back\\\\slash and \\`tick\\`\n",
];

fn shape(src: &str) -> Vec<&'static str> {
    let doc = Document::parse(src);
    doc.descendants(doc.root())
        .map(|id| doc.kind(id).name())
        .collect()
}

/// Block structure only; wrapping splits text into more inline nodes.
fn block_shape(src: &str) -> Vec<&'static str> {
    let doc = Document::parse(src);
    doc.descendants(doc.root())
        .filter(|id| doc.kind(*id).is_block())
        .map(|id| doc.kind(id).name())
        .collect()
}

fn render(src: &str, options: RendererOptions) -> String {
    let doc = Document::parse(src);
    Renderer::new(options).render_to_string(&doc).unwrap().0
}

#[test]
fn unwrapped_output_reparses_to_the_same_shape() {
    for src in CORPUS {
        let out = render(src, RendererOptions::default());
        assert_eq!(shape(&out), shape(src), "input {src:?}\noutput {out:?}");
    }
}

#[test]
fn rendering_is_idempotent() {
    for src in CORPUS {
        let once = render(src, RendererOptions::default());
        let twice = render(&once, RendererOptions::default());
        assert_eq!(twice, once, "input {src:?}");
    }
}

#[test]
fn wrapped_paragraphs_keep_their_shape() {
    let src = "\
A paragraph long enough to be wrapped several times over at a narrow width.

- a list item that also needs to wrap onto a second line

> and a quote that wraps as well, keeping its marker
";
    let out = render(
        src,
        RendererOptions {
            word_wrap: 24,
            pad: false,
            ..RendererOptions::default()
        },
    );
    assert!(out.lines().count() > 6);
    assert_eq!(block_shape(&out), block_shape(src));
}
