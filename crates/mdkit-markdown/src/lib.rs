//! Markdown for the terminal: a streaming re-renderer and an interactive viewer.
//!
//! ## Layers
//!
//! - [`ast`]: a closed node tree built from `pulldown-cmark`, keeping the source details
//!   (fences, markers, reference forms) needed to write Markdown back out.
//! - [`render`]: walks a [`ast::Document`] once and writes Markdown source re-wrapped to a
//!   width, optionally styled with SGR escapes, returning a [`span::SpanTree`] that maps every
//!   node to the output bytes it produced.
//! - [`index`]: headings as nested sections with GitHub-style anchors.
//! - [`view::MarkdownView`]: a ratatui widget that scrolls the rendered output and navigates its
//!   links and headings through the span tree.
//!
//! ```
//! use mdkit_markdown::ast::Document;
//! use mdkit_markdown::render::Renderer;
//! use mdkit_markdown::render::RendererOptions;
//!
//! let doc = Document::parse("# Hello\n\nSome *text*.\n");
//! let renderer = Renderer::new(RendererOptions {
//!     word_wrap: 40,
//!     pad: false,
//!     ..RendererOptions::default()
//! });
//! let (text, spans) = renderer.render_to_string(&doc).unwrap();
//! assert_eq!(text, "# Hello\n\nSome *text*.\n");
//! assert_eq!(spans.get(spans.root()).end, text.len());
//! ```
pub mod ast;
pub mod error;
pub mod index;
pub mod render;
pub mod span;
pub mod view;
