//! SQL lexer used for boundary-aware column qualification.
//!
//! This is not a validating front end: it never rejects input, keeps
//! comments as tokens and reports byte spans so rewrites can be applied to
//! the input text without disturbing its layout.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
