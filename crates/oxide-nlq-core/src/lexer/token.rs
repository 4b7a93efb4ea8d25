//! Token types for the qualification lexer.

use super::Span;

/// Keywords the normalizer needs to recognise.
///
/// Anything else that looks like a word is reported as an identifier, which
/// is the right answer for column and table names and harmless for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    From,
    Where,
    Group,
    Order,
    By,
    Having,
    Limit,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,
    Using,
    As,
    And,
    Or,
    Not,
    Distinct,
    Union,
    Asc,
    Desc,
}

impl Keyword {
    /// Looks up a keyword, ignoring ASCII case.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Self> {
        let keyword = match word.to_ascii_uppercase().as_str() {
            "SELECT" => Self::Select,
            "FROM" => Self::From,
            "WHERE" => Self::Where,
            "GROUP" => Self::Group,
            "ORDER" => Self::Order,
            "BY" => Self::By,
            "HAVING" => Self::Having,
            "LIMIT" => Self::Limit,
            "JOIN" => Self::Join,
            "INNER" => Self::Inner,
            "LEFT" => Self::Left,
            "RIGHT" => Self::Right,
            "FULL" => Self::Full,
            "OUTER" => Self::Outer,
            "CROSS" => Self::Cross,
            "ON" => Self::On,
            "USING" => Self::Using,
            "AS" => Self::As,
            "AND" => Self::And,
            "OR" => Self::Or,
            "NOT" => Self::Not,
            "DISTINCT" => Self::Distinct,
            "UNION" => Self::Union,
            "ASC" => Self::Asc,
            "DESC" => Self::Desc,
            _ => return None,
        };
        Some(keyword)
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    /// A bare identifier, exactly as written.
    Identifier(String),
    /// A `"quoted"`, `` `quoted` `` or `[bracketed]` identifier, unquoted.
    QuotedIdentifier(String),
    /// A string literal with quotes removed and `''` unescaped.
    String(String),
    Number,
    Dot,
    Comma,
    LeftParen,
    RightParen,
    Semicolon,
    Star,
    /// Any other operator or punctuation character sequence.
    Operator,
    /// A `--` or `/* */` comment, including its delimiters.
    Comment,
    /// Malformed input, such as an unterminated string literal.
    Error(String),
    Eof,
}

/// A token with its location in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Returns true for tokens that carry no SQL meaning.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Comment)
    }
}
