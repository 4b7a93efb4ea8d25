//! SQL tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input without ever failing.
///
/// Unlike a parser front end, this lexer keeps comments as tokens and turns
/// malformed input into [`TokenKind::Error`] tokens so that the caller can
/// still locate every identifier in a half-broken statement. An opening
/// quote or `/*` that is never closed becomes an error token of its own and
/// scanning resumes right after it.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Scans a `-- ...` comment up to (not including) the line break.
    fn scan_line_comment(&mut self) -> Token {
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
        self.make_token(TokenKind::Comment)
    }

    /// Scans a `/* ... */` comment.
    fn scan_block_comment(&mut self) -> Token {
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return self.make_token(TokenKind::Comment);
                }
                Some(_) => {}
                None => return self.unterminated(2, "unterminated block comment"),
            }
        }
    }

    /// Rewinds to just past the opener and reports it as an error token.
    fn unterminated(&mut self, opener_len: usize, message: &str) -> Token {
        self.pos = self.start + opener_len;
        self.make_token(TokenKind::Error(message.to_string()))
    }

    fn scan_identifier(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        match Keyword::lookup(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(text.to_string())),
        }
    }

    /// Scans a delimited run where a doubled delimiter escapes itself.
    ///
    /// Returns the unescaped content, or `None` if the input ended first.
    fn scan_delimited(&mut self, open: char, close: char) -> Option<String> {
        self.advance(); // opening delimiter
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == close => {
                    if open == close && self.peek() == Some(close) {
                        value.push(close);
                        self.advance();
                    } else {
                        return Some(value);
                    }
                }
                Some(c) => value.push(c),
                None => return None,
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        match self.scan_delimited('\'', '\'') {
            Some(value) => self.make_token(TokenKind::String(value)),
            None => self.unterminated(1, "unterminated string literal"),
        }
    }

    fn scan_quoted_identifier(&mut self, open: char, close: char) -> Token {
        match self.scan_delimited(open, close) {
            Some(name) => self.make_token(TokenKind::QuotedIdentifier(name)),
            None => self.unterminated(open.len_utf8(), "unterminated quoted identifier"),
        }
    }

    fn scan_number(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E')
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '-' if self.peek_next() == Some('-') => self.scan_line_comment(),
            '/' if self.peek_next() == Some('*') => self.scan_block_comment(),
            '\'' => self.scan_string(),
            '"' => self.scan_quoted_identifier('"', '"'),
            '`' => self.scan_quoted_identifier('`', '`'),
            '[' => self.scan_quoted_identifier('[', ']'),
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),
            _ => {
                self.advance();
                let kind = match c {
                    '.' => TokenKind::Dot,
                    ',' => TokenKind::Comma,
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    ';' => TokenKind::Semicolon,
                    '*' => TokenKind::Star,
                    '<' | '>' | '!' | '|' | ':' => {
                        if matches!(self.peek(), Some('=' | '>' | '|' | ':' | '<')) {
                            self.advance();
                        }
                        TokenKind::Operator
                    }
                    _ => TokenKind::Operator,
                };
                self.make_token(kind)
            }
        }
    }

    /// Tokenizes the entire input. The last token is always [`TokenKind::Eof`].
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
