use mdkit_core::text::CodeHighlighter;
use mdkit_core::text::Token;
use mdkit_core::theme::TokenClass;
use syntect::easy::ScopeRegionIterator;
use syntect::parsing::ParseState;
use syntect::parsing::Scope;
use syntect::parsing::ScopeStack;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Scope prefixes in priority order. A token takes the class of the first prefix that matches
/// any scope on its stack, so a comment's punctuation still reads as comment.
const SCOPE_CLASSES: &[(&str, TokenClass)] = &[
    ("comment", TokenClass::Comment),
    ("constant.character.escape", TokenClass::LiteralStringEscape),
    ("string", TokenClass::LiteralString),
    ("constant.numeric", TokenClass::LiteralNumber),
    ("constant", TokenClass::Literal),
    ("keyword.operator", TokenClass::Operator),
    ("keyword", TokenClass::Keyword),
    ("storage", TokenClass::Keyword),
    ("entity.name.function", TokenClass::NameFunction),
    ("entity.name.tag", TokenClass::NameTag),
    ("entity.name", TokenClass::NameClass),
    ("entity.other.attribute-name", TokenClass::NameAttribute),
    ("variable.function", TokenClass::NameFunction),
    ("variable", TokenClass::NameVariable),
    ("support.function", TokenClass::NameBuiltin),
    ("support", TokenClass::NameBuiltin),
    ("meta.annotation", TokenClass::NameDecorator),
    ("punctuation", TokenClass::Punctuation),
    ("invalid", TokenClass::Error),
    ("markup.heading", TokenClass::GenericHeading),
    ("markup.bold", TokenClass::GenericStrong),
    ("markup.italic", TokenClass::GenericEmph),
    ("markup.inserted", TokenClass::GenericInserted),
    ("markup.deleted", TokenClass::GenericDeleted),
    ("markup.underline", TokenClass::GenericUnderline),
];

/// Tokenizes code with syntect's bundled grammars and maps TextMate scopes onto token classes.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    classes: Vec<(Scope, TokenClass)>,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self::with_syntax_set(SyntaxSet::load_defaults_newlines())
    }

    /// Uses a caller-supplied grammar set. The set must be built with newline-terminated lines.
    pub fn with_syntax_set(syntax_set: SyntaxSet) -> Self {
        let classes = SCOPE_CLASSES
            .iter()
            .filter_map(|(prefix, class)| Scope::new(prefix).ok().map(|s| (s, *class)))
            .collect();
        Self {
            syntax_set,
            classes,
        }
    }

    fn syntax_for(&self, language: Option<&str>, code: &str) -> Option<&SyntaxReference> {
        match language {
            Some(lang) => self
                .syntax_set
                .find_syntax_by_extension(lang)
                .or_else(|| self.syntax_set.find_syntax_by_token(lang)),
            None => self.syntax_set.find_syntax_by_first_line(code),
        }
    }

    fn classify(&self, stack: &ScopeStack) -> TokenClass {
        let scopes = stack.as_slice();
        self.classes
            .iter()
            .find(|(prefix, _)| scopes.iter().rev().any(|s| prefix.is_prefix_of(*s)))
            .map_or(TokenClass::Text, |(_, class)| *class)
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn tokenize(&self, language: Option<&str>, code: &str) -> Option<Vec<Token>> {
        let syntax = self.syntax_for(language, code)?;
        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens: Vec<Token> = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ops = match state.parse_line(line, &self.syntax_set) {
                Ok(ops) => ops,
                Err(err) => {
                    tracing::debug!(syntax = %syntax.name, error = %err, "syntax parse failed");
                    return None;
                }
            };
            for (text, op) in ScopeRegionIterator::new(&ops, line) {
                if stack.apply(op).is_err() {
                    return None;
                }
                if text.is_empty() {
                    continue;
                }
                let class = self.classify(&stack);
                match tokens.last_mut() {
                    Some(last) if last.class == class => last.text.push_str(text),
                    _ => tokens.push(Token::new(class, text)),
                }
            }
        }
        Some(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn tokens_reproduce_the_input() {
        let h = SyntectHighlighter::new();
        let code = "fn main() {\n    let x = \"hi\"; // done\n}\n";
        let tokens = h.tokenize(Some("rust"), code).unwrap();
        assert_eq!(joined(&tokens), code);
    }

    #[test]
    fn scopes_map_onto_token_classes() {
        let h = SyntectHighlighter::new();
        let tokens = h.tokenize(Some("rs"), "let s = \"x\"; // c\n").unwrap();
        let class_of = |needle: &str| {
            tokens
                .iter()
                .find(|t| t.text.contains(needle))
                .map(|t| t.class)
        };
        assert_eq!(class_of("let"), Some(TokenClass::Keyword));
        assert_eq!(class_of("// c"), Some(TokenClass::Comment));
        assert!(
            tokens
                .iter()
                .any(|t| t.class == TokenClass::LiteralString && t.text.contains('x'))
        );
    }

    #[test]
    fn adjacent_tokens_never_share_a_class() {
        let h = SyntectHighlighter::new();
        let tokens = h.tokenize(Some("py"), "x = 1 + 2\n").unwrap();
        assert!(tokens.windows(2).all(|w| w[0].class != w[1].class));
    }

    #[test]
    fn unknown_language_means_passthrough() {
        let h = SyntectHighlighter::new();
        assert_eq!(h.tokenize(Some("no-such-language"), "abc\n"), None);
        assert_eq!(h.tokenize(None, "just some words\n"), None);
    }

    #[test]
    fn untagged_code_is_detected_from_first_line() {
        let h = SyntectHighlighter::new();
        let code = "#!/bin/bash\necho hi\n";
        let tokens = h.tokenize(None, code).unwrap();
        assert_eq!(joined(&tokens), code);
    }
}
