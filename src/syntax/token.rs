use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::span::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Literal,
    Pragma,
}

impl TokenKind {
    /// Guess the kind of a bare spelling: numbers, character and string
    /// literals are literals, everything else is an identifier.
    fn classify(text: &str) -> Self {
        match text.chars().next() {
            Some(c) if c.is_ascii_digit() || c == '.' || c == '"' || c == '\'' => {
                TokenKind::Literal
            }
            Some('-') if text[1..].starts_with(|c: char| c.is_ascii_digit()) => TokenKind::Literal,
            _ => TokenKind::Identifier,
        }
    }
}

/// An immutable lexeme shared between the original tree and its clones.
///
/// The spelling is reference counted: cloning a `Token` never copies text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "TokenRepr")]
pub struct Token {
    pub kind: TokenKind,
    pub text: Arc<str>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, span: Span) -> Self {
        Self {
            kind,
            text: Arc::from(text),
            span,
        }
    }

    pub fn ident(text: &str) -> Self {
        Self::new(TokenKind::Identifier, text, Span::dummy())
    }

    pub fn literal(text: &str) -> Self {
        Self::new(TokenKind::Literal, text, Span::dummy())
    }

    /// A pragma body, without the leading `#pragma`.
    pub fn pragma(text: &str) -> Self {
        Self::new(TokenKind::Pragma, text.trim(), Span::dummy())
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when both tokens point at the same interned spelling.
    pub fn shares_text(&self, other: &Token) -> bool {
        Arc::ptr_eq(&self.text, &other.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Accepted JSON forms: `"name"` or `{ "text": "name", "span": {...} }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenRepr {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        span: Span,
    },
}

impl From<TokenRepr> for Token {
    fn from(repr: TokenRepr) -> Self {
        let (text, span) = match repr {
            TokenRepr::Text(text) => (text, Span::dummy()),
            TokenRepr::Full { text, span } => (text, span),
        };
        Token::new(TokenKind::classify(&text), &text, span)
    }
}
