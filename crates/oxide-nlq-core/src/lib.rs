//! # oxide-nlq-core
//!
//! Turns the free-form text a language model returns for a natural language
//! question into a SQL statement that a database will accept.
//!
//! The crate is pure: no network, no database, no shared state. It provides:
//!
//! - [`extract`] - isolates one SQL statement from fences, explanations
//!   and conversational padding
//! - [`normalize`] - qualifies column names that are ambiguous across joined
//!   tables, driven by an injectable [`AmbiguityRules`] table
//! - [`schema`] and [`prompt`] - the schema description the prompt is built
//!   from, and the prompt itself
//! - [`lexer`] - the forgiving tokenizer behind boundary-aware qualification
//!
//! ## Example
//!
//! ```rust
//! use oxide_nlq_core::{extract, normalize};
//!
//! let raw = "Sure! Here's the SQL:\n```sql\n\
//!            SELECT CustomerID, COUNT(*) FROM Customers JOIN Orders \
//!            ON Customers.CustomerID = Orders.CustomerID GROUP BY CustomerID\n```";
//!
//! let candidate = extract(raw).unwrap();
//! let sql = normalize(&candidate.sql);
//! assert_eq!(
//!     sql,
//!     "SELECT Customers.CustomerID, COUNT(*) FROM Customers JOIN Orders \
//!      ON Customers.CustomerID = Orders.CustomerID GROUP BY Customers.CustomerID"
//! );
//! ```

pub mod error;
pub mod extract;
pub mod lexer;
pub mod normalize;
pub mod prompt;
pub mod schema;

pub use error::{ExtractError, Result};
pub use extract::{CandidateSql, Extractor, ExtractorConfig, Strategy, extract};
pub use normalize::{AmbiguityRule, AmbiguityRules, MatchMode, Normalizer, normalize};
pub use prompt::{PromptBuilder, build_prompt};
pub use schema::{ColumnDescription, ForeignKey, SchemaDescription, TableDescription};
