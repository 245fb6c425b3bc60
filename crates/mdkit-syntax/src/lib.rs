//! Syntax tokenizer backends for mdkit.
//!
//! Backends implement [`mdkit_core::text::CodeHighlighter`], turning code into classified tokens
//! that the renderer styles through the active theme. Enable the `syntect` feature for
//! [`syntect::SyntectHighlighter`].
#[cfg(feature = "syntect")]
pub mod syntect;
