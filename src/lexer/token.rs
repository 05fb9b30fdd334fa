//! Token types for GraphQL lexical analysis.

use std::fmt;

use smol_str::SmolStr;

use crate::ast::Span;

/// The kind of a lexical token.
///
/// GraphQL has no reserved words: `query`, `fragment`, `on`, `true` and
/// friends are lexed as [`TokenKind::Name`] and interpreted by the parser
/// from context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuators
    Bang,
    Dollar,
    Amp,
    LParen,
    RParen,
    Spread,
    Colon,
    Equals,
    At,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Pipe,

    // Lexical values
    Name(SmolStr),
    IntValue(String),
    FloatValue(String),
    /// A quoted string, already unescaped.
    StringValue(String),
    /// A `"""` block string after indentation stripping.
    BlockString(String),

    Eof,
}

impl TokenKind {
    /// Returns true for punctuator tokens.
    pub fn is_punctuator(&self) -> bool {
        matches!(
            self,
            Self::Bang
                | Self::Dollar
                | Self::Amp
                | Self::LParen
                | Self::RParen
                | Self::Spread
                | Self::Colon
                | Self::Equals
                | Self::At
                | Self::LBracket
                | Self::RBracket
                | Self::LBrace
                | Self::RBrace
                | Self::Pipe
        )
    }

    /// Returns true for literal value tokens.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::IntValue(_) | Self::FloatValue(_) | Self::StringValue(_) | Self::BlockString(_)
        )
    }

    /// Returns true if this is a name token spelled exactly `keyword`.
    pub fn is_name(&self, keyword: &str) -> bool {
        matches!(self, Self::Name(name) if name == keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Dollar => write!(f, "'$'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Spread => write!(f, "'...'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::At => write!(f, "'@'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Name(name) => write!(f, "name '{name}'"),
            TokenKind::IntValue(text) => write!(f, "integer {text}"),
            TokenKind::FloatValue(text) => write!(f, "float {text}"),
            TokenKind::StringValue(_) => write!(f, "string"),
            TokenKind::BlockString(_) => write!(f, "block string"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its location in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the source slice covered by this token.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_creation() {
        let token = Token::new(TokenKind::Name("query".into()), 0..5);
        assert!(token.kind.is_name("query"));
        assert!(!token.kind.is_name("mutation"));
        assert_eq!(token.slice("query { f }"), "query");
    }

    #[test]
    fn classification() {
        assert!(TokenKind::Spread.is_punctuator());
        assert!(!TokenKind::Name("on".into()).is_punctuator());
        assert!(TokenKind::IntValue("1".into()).is_literal());
        assert!(TokenKind::BlockString(String::new()).is_literal());
        assert!(!TokenKind::Eof.is_literal());
    }

    #[test]
    fn display() {
        assert_eq!(TokenKind::LBrace.to_string(), "'{'");
        assert_eq!(TokenKind::Name("f".into()).to_string(), "name 'f'");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
