use crate::theme::TokenClass;

/// A run of source text tagged with its syntactic class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub class: TokenClass,
    pub text: String,
}

impl Token {
    pub fn new(class: TokenClass, text: impl Into<String>) -> Self {
        Self {
            class,
            text: text.into(),
        }
    }
}

/// Splits code into classified tokens.
///
/// `language` is the info-string tag of a fenced block, or `None` for untagged code, in which case
/// implementations may guess from the content. Returning `None` means "no lexer": the caller writes
/// the code verbatim. Concatenating the returned token texts must reproduce `code` exactly.
pub trait CodeHighlighter {
    fn tokenize(&self, language: Option<&str>, code: &str) -> Option<Vec<Token>>;
}

pub struct NoHighlight;

impl CodeHighlighter for NoHighlight {
    fn tokenize(&self, _language: Option<&str>, _code: &str) -> Option<Vec<Token>> {
        None
    }
}
