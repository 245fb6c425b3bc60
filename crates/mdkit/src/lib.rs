//! Markdown for the terminal.
//!
//! This crate re-exports the mdkit workspace under one name:
//!
//! - [`core`]: themes, SGR style deltas, width measurement, the kitty graphics codec and the
//!   viewport/key-binding primitives.
//! - [`markdown`]: the Markdown tree, the streaming renderer with its span tree, the heading
//!   index and the [`markdown::view::MarkdownView`] widget.
//! - `syntax` (feature `syntect`): code tokenizers for fenced blocks.
//!
//! With the default `cli` feature it also builds two tools: `mdcat`, which renders a file to
//! standard output, and `mdreader`, an interactive reader with link and heading navigation.
pub use mdkit_core as core;
pub use mdkit_markdown as markdown;
#[cfg(feature = "syntect")]
pub use mdkit_syntax as syntax;

pub use mdkit_markdown::ast::Document;
pub use mdkit_markdown::render::Renderer;
pub use mdkit_markdown::render::RendererOptions;
pub use mdkit_markdown::view::MarkdownView;

/// The code tokenizer the tools use: syntect when enabled, plain text otherwise.
pub fn default_highlighter()
-> std::sync::Arc<dyn mdkit_core::text::CodeHighlighter + Send + Sync> {
    #[cfg(feature = "syntect")]
    {
        std::sync::Arc::new(mdkit_syntax::syntect::SyntectHighlighter::new())
    }
    #[cfg(not(feature = "syntect"))]
    {
        std::sync::Arc::new(mdkit_core::text::NoHighlight)
    }
}
