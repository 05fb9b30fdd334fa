//! Lexical analysis for GraphQL executable documents.
//!
//! The lexer is error-tolerant: it records a diagnostic for every malformed
//! token and keeps scanning, so a single run reports every lexical problem.
//! Whitespace, commas, the byte order mark and `#` comments are ignored.

pub mod token;

use crate::diag::Diag;
use token::{Token, TokenKind};

/// Result of lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens produced, always terminated by an EOF token.
    pub tokens: Vec<Token>,
    /// Diagnostics encountered during scanning.
    pub diagnostics: Vec<Diag>,
}

/// A lexical analyzer for GraphQL source text.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes the source text, consuming the lexer.
    pub fn tokenize(mut self) -> LexerResult {
        loop {
            self.skip_ignored();
            if self.is_at_end() {
                break;
            }
            self.scan_token();
        }

        let eof_pos = self.source.len();
        self.tokens.push(Token::new(TokenKind::Eof, eof_pos..eof_pos));

        LexerResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn scan_token(&mut self) {
        let start = self.pos;
        let ch = self.advance();

        match ch {
            '!' => self.add_token(TokenKind::Bang, start),
            '$' => self.add_token(TokenKind::Dollar, start),
            '&' => self.add_token(TokenKind::Amp, start),
            '(' => self.add_token(TokenKind::LParen, start),
            ')' => self.add_token(TokenKind::RParen, start),
            ':' => self.add_token(TokenKind::Colon, start),
            '=' => self.add_token(TokenKind::Equals, start),
            '@' => self.add_token(TokenKind::At, start),
            '[' => self.add_token(TokenKind::LBracket, start),
            ']' => self.add_token(TokenKind::RBracket, start),
            '{' => self.add_token(TokenKind::LBrace, start),
            '}' => self.add_token(TokenKind::RBrace, start),
            '|' => self.add_token(TokenKind::Pipe, start),
            '.' => {
                if self.peek() == '.' && self.peek_next() == '.' {
                    self.advance();
                    self.advance();
                    self.add_token(TokenKind::Spread, start);
                } else {
                    // Consume the rest of a partial spread so it is reported once.
                    while self.peek() == '.' {
                        self.advance();
                    }
                    self.error_span(start..self.pos, "expected '...'", "L001");
                }
            }
            '"' => {
                if self.peek() == '"' && self.peek_next() == '"' {
                    self.advance();
                    self.advance();
                    self.scan_block_string(start);
                } else {
                    self.scan_string(start);
                }
            }
            '-' | '0'..='9' => self.scan_number(start, ch),
            c if is_name_start(c) => self.scan_name(start),
            _ => self.error(start, &format!("unexpected character '{}'", ch.escape_debug())),
        }
    }

    fn scan_name(&mut self, start: usize) {
        while is_name_continue(self.peek()) {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        self.add_token(TokenKind::Name(text.into()), start);
    }

    /// Scans `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
    fn scan_number(&mut self, start: usize, first: char) {
        let mut valid = true;
        let mut is_float = false;

        let lead = if first == '-' { self.advance() } else { first };
        if !lead.is_ascii_digit() {
            self.error(start, "expected digit after '-'");
            return;
        }
        if lead == '0' && self.peek().is_ascii_digit() {
            valid = false;
        }
        self.skip_digits();

        if self.peek() == '.' && self.peek_next() != '.' {
            is_float = true;
            self.advance();
            if !self.peek().is_ascii_digit() {
                valid = false;
            }
            self.skip_digits();
        }

        if matches!(self.peek(), 'e' | 'E') {
            is_float = true;
            self.advance();
            if matches!(self.peek(), '+' | '-') {
                self.advance();
            }
            if !self.peek().is_ascii_digit() {
                valid = false;
            }
            self.skip_digits();
        }

        // A number directly followed by a name start or '.' is malformed, e.g. `1x`.
        if is_name_start(self.peek()) || self.peek() == '.' && self.peek_next() != '.' {
            valid = false;
            while is_name_continue(self.peek()) || self.peek() == '.' {
                self.advance();
            }
        }

        let text = self.source[start..self.pos].to_string();
        if !valid {
            self.error_span(
                start..self.pos,
                &format!("malformed numeric literal '{text}'"),
                "L002",
            );
        }

        let kind = if is_float {
            TokenKind::FloatValue(text)
        } else {
            TokenKind::IntValue(text)
        };
        self.add_token(kind, start);
    }

    fn skip_digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
    }

    fn scan_string(&mut self, start: usize) {
        let mut value = String::new();

        loop {
            if self.is_at_end() || matches!(self.peek(), '\n' | '\r') {
                self.error(start, "unterminated string");
                break;
            }
            match self.peek() {
                '"' => {
                    self.advance();
                    break;
                }
                '\\' => {
                    let escape_start = self.pos;
                    self.advance();
                    self.scan_escape(escape_start, &mut value);
                }
                _ => value.push(self.advance()),
            }
        }

        self.add_token(TokenKind::StringValue(value), start);
    }

    fn scan_escape(&mut self, escape_start: usize, value: &mut String) {
        // A backslash at the end of the line leaves the string unterminated.
        if self.is_at_end() || matches!(self.peek(), '\n' | '\r') {
            return;
        }

        let escaped = self.advance();
        match escaped {
            '"' => value.push('"'),
            '\\' => value.push('\\'),
            '/' => value.push('/'),
            'b' => value.push('\u{0008}'),
            'f' => value.push('\u{000C}'),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'u' => self.scan_unicode_escape(escape_start, value),
            _ => {
                self.error_span(
                    escape_start..self.pos,
                    &format!("invalid escape sequence '\\{}'", escaped.escape_debug()),
                    "L003",
                );
                value.push(escaped);
            }
        }
    }

    /// Scans the rest of `\uXXXX`, a surrogate pair `\uXXXX\uXXXX`, or
    /// `\u{X...}` with up to six hex digits.
    fn scan_unicode_escape(&mut self, escape_start: usize, value: &mut String) {
        let braced = self.peek() == '{';
        let code = if braced {
            self.advance();
            let digits = self.take_hex_digits(6);
            if digits.is_empty() || self.peek() != '}' {
                None
            } else {
                self.advance();
                u32::from_str_radix(&digits, 16).ok()
            }
        } else {
            let digits = self.take_hex_digits(4);
            u32::from_str_radix(&digits, 16)
                .ok()
                .filter(|_| digits.len() == 4)
        };

        let Some(mut code) = code else {
            self.error_span(
                escape_start..self.pos,
                "invalid unicode escape sequence",
                "L003",
            );
            return;
        };

        if !braced && (0xD800..=0xDBFF).contains(&code) {
            if let Some(low) = self.scan_low_surrogate() {
                code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            }
        }

        match char::from_u32(code) {
            Some(ch) => value.push(ch),
            None => self.error_span(
                escape_start..self.pos,
                "invalid unicode code point",
                "L003",
            ),
        }
    }

    /// Consumes a following `\uXXXX` escape if it encodes a low surrogate.
    fn scan_low_surrogate(&mut self) -> Option<u32> {
        let digits = self.source[self.pos..].strip_prefix("\\u")?.get(..4)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let low = u32::from_str_radix(digits, 16)
            .ok()
            .filter(|low| (0xDC00..=0xDFFF).contains(low))?;
        self.pos += 2 + digits.len();
        Some(low)
    }

    fn take_hex_digits(&mut self, max: usize) -> String {
        let mut digits = String::with_capacity(max);
        while digits.len() < max && self.peek().is_ascii_hexdigit() {
            digits.push(self.advance());
        }
        digits
    }

    fn scan_block_string(&mut self, start: usize) {
        let mut raw = String::new();

        loop {
            if self.is_at_end() {
                self.error(start, "unterminated block string");
                break;
            }
            if self.source[self.pos..].starts_with("\"\"\"") {
                self.pos += 3;
                break;
            }
            if self.source[self.pos..].starts_with("\\\"\"\"") {
                self.pos += 4;
                raw.push_str("\"\"\"");
                continue;
            }
            raw.push(self.advance());
        }

        self.add_token(TokenKind::BlockString(block_string_value(&raw)), start);
    }

    /// Skips whitespace, commas, the BOM and comments.
    fn skip_ignored(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\t' | '\r' | '\n' | ',' | '\u{FEFF}' => {
                    self.advance();
                }
                '#' => {
                    while !matches!(self.peek(), '\n' | '\r') && !self.is_at_end() {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, start..self.pos));
    }

    fn error(&mut self, pos: usize, message: &str) {
        let end = self.source[pos..]
            .chars()
            .next()
            .map(|ch| pos + ch.len_utf8())
            .unwrap_or(pos);
        self.error_span(pos..end, message, "L001");
    }

    fn error_span(&mut self, span: std::ops::Range<usize>, message: &str, code: &str) {
        self.diagnostics.push(
            Diag::error(message)
                .with_primary_label(span, "here")
                .with_code(code),
        );
    }

    fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let ch = self.peek();
        if !self.is_at_end() {
            self.pos += ch.len_utf8();
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_name_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Applies the GraphQL block string algorithm: strip the common indentation
/// of every line but the first, then drop leading and trailing blank lines.
fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').map(|l| l.trim_end_matches('\r')).collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            (indent < line.len()).then_some(indent)
        })
        .min()
        .unwrap_or(0);

    let mut stripped: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                *line
            } else {
                line.get(common_indent..).unwrap_or("")
            }
        })
        .collect();

    let is_blank = |line: &&str| line.trim_matches([' ', '\t']).is_empty();
    while stripped.first().is_some_and(is_blank) {
        stripped.remove(0);
    }
    while stripped.last().is_some_and(is_blank) {
        stripped.pop();
    }

    stripped.join("\n")
}

/// Convenience function to tokenize a source string.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
