use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use mdkit_core::text::NoHighlight;
use mdkit_core::theme::Theme;
use mdkit_markdown::ast::Document;
use mdkit_markdown::render::Renderer;
use mdkit_markdown::render::RendererOptions;
use mdkit_markdown::view::MarkdownView;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::sync::Arc;

fn sample_markdown(code_lines: usize) -> String {
    let mut s = String::new();
    s.push_str("# Performance\n\n");
    s.push_str("This is a long paragraph to stress wrapping. ");
    for _ in 0..12 {
        s.push_str("The quick brown fox jumps over the lazy dog. ");
    }
    s.push('\n');
    s.push('\n');

    s.push_str("## Task List\n\n");
    s.push_str("- [x] task list item\n");
    s.push_str("- [ ] task list item with a [link](https://example.com)\n\n");

    s.push_str("> A quote that goes on for long enough to need wrapping inside its prefix, ");
    s.push_str("and then some more.\n\n");

    s.push_str("## Table\n\n");
    s.push_str("| Name | Value | Notes |\n");
    s.push_str("|:-----|------:|:------|\n");
    s.push_str("| foo  | 123   | left / right alignment |\n");
    s.push_str("| bar  | 456   | `code` in a cell |\n\n");

    s.push_str("## Code\n\n");
    s.push_str("```rs\n");
    s.push_str("fn main() {\n");
    for i in 0..code_lines {
        s.push_str(&format!("    let x{i} = {i} + 1;\n"));
    }
    s.push_str("    println!(\"done\");\n");
    s.push_str("}\n");
    s.push_str("```\n");
    s
}

fn bench_render_plain(c: &mut Criterion) {
    let md = sample_markdown(200);
    let renderer = Renderer::new(RendererOptions {
        word_wrap: 80,
        ..RendererOptions::default()
    });
    c.bench_function("render/plain/wrap80", |b| {
        b.iter(|| {
            let doc = Document::parse(black_box(&md));
            let mut out = Vec::with_capacity(md.len() * 2);
            let spans = renderer.render(&mut out, &doc).unwrap();
            black_box((out.len(), spans.len()));
        })
    });
}

fn bench_render_themed(c: &mut Criterion) {
    let md = sample_markdown(200);
    let renderer = Renderer::new(RendererOptions {
        theme: Some(Theme::pulumi()),
        word_wrap: 80,
        ..RendererOptions::default()
    })
    .with_highlighter(Arc::new(NoHighlight));
    c.bench_function("render/themed/wrap80", |b| {
        b.iter(|| {
            let doc = Document::parse(black_box(&md));
            let mut out = Vec::with_capacity(md.len() * 4);
            let spans = renderer.render(&mut out, &doc).unwrap();
            black_box((out.len(), spans.len()));
        })
    });
}

fn bench_view_layout(c: &mut Criterion) {
    let md = sample_markdown(200);
    let area = Rect::new(0, 0, 96, 40);
    c.bench_function("markdown_view/set_markdown+draw", |b| {
        b.iter(|| {
            let mut view = MarkdownView::new();
            view.set_markdown(black_box(&md));
            let mut buf = Buffer::empty(area);
            view.render_ref(area, &mut buf);
            black_box(view.line_count());
        })
    });
}

criterion_group!(
    benches,
    bench_render_plain,
    bench_render_themed,
    bench_view_layout
);
criterion_main!(benches);
