//! `mdkit-core` holds the pieces of mdkit that know nothing about Markdown.
//!
//! - [`theme`] and [`sgr`]: token classes, style entries and the minimal SGR delta codec.
//! - [`measure`]: grapheme-cluster widths of text that carries escape sequences.
//! - [`kitty`]: the kitty graphics protocol encoder and decoder.
//! - [`text`]: the [`text::CodeHighlighter`] seam implemented by `mdkit-syntax`.
//! - [`viewport`], [`scroll`], [`keymap`], [`input`], [`render`], [`help`]: the scrolling and
//!   key-binding primitives the viewer widget is built from.
//!
//! Everything here is synchronous and event-loop agnostic. Enable the `crossterm` feature for
//! [`crossterm_input`] conversions.
pub mod theme;

pub mod kitty;
pub mod measure;
pub mod sgr;
pub mod text;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod help;
pub mod input;
pub mod keymap;
pub mod render;
pub mod scroll;
pub mod viewport;
