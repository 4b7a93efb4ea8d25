//! Qualification of ambiguous column references.
//!
//! A model that joins `Customers` and `Orders` often writes a bare
//! `CustomerID` in the select list, which SQLite rejects as ambiguous. The
//! [`Normalizer`] rewrites such references to the preferred table using a
//! rule table built from the schema's foreign keys.
//!
//! The rewrite only runs when the statement contains `JOIN` (any case), and
//! only on lines containing `SELECT`, `GROUP BY` or `ORDER BY`. Everything
//! else, including line breaks, is passed through as is. The function is
//! total: the worst outcome is the input, unchanged.
//!
//! Two matching modes exist:
//!
//! - [`MatchMode::Token`] (default) tokenizes the statement and rewrites
//!   each bare, unqualified identifier that names a rule's column. Already
//!   qualified references, quoted identifiers, string literals, comments,
//!   function names, `AS` aliases and `USING (...)` lists are left alone.
//!   A quote or `/*` that is never closed does not hide the rest of the
//!   statement: only the stray opener is skipped.
//! - [`MatchMode::Substring`] reproduces the earlier text-replacement
//!   behaviour: if a line mentions the column but no accepted qualified
//!   form of it, every occurrence of the name is replaced, including inside
//!   longer identifiers such as `NewCustomerIDTag`.

mod rules;

pub use rules::{AmbiguityRule, AmbiguityRules};

use tracing::debug;

use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Clause keywords that make a line eligible for rewriting.
const CLAUSE_KEYWORDS: &[&str] = &["SELECT", "GROUP BY", "ORDER BY"];

/// How column names are located within a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Plain substring search and replace.
    Substring,
    /// Identifier tokens with word boundaries.
    #[default]
    Token,
}

/// Rewrites bare ambiguous columns to their preferred qualified form.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: AmbiguityRules,
    mode: MatchMode,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(AmbiguityRules::canonical())
    }
}

impl Normalizer {
    /// Creates a normalizer using token matching.
    #[must_use]
    pub fn new(rules: AmbiguityRules) -> Self {
        Self {
            rules,
            mode: MatchMode::default(),
        }
    }

    /// Sets the matching mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// The rule table in use.
    #[must_use]
    pub const fn rules(&self) -> &AmbiguityRules {
        &self.rules
    }

    /// The matching mode in use.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Qualifies ambiguous columns in `sql`.
    #[must_use]
    pub fn normalize(&self, sql: &str) -> String {
        if self.rules.is_empty() || !has_join(sql) {
            return sql.to_string();
        }
        match self.mode {
            MatchMode::Substring => self.normalize_substring(sql),
            MatchMode::Token => self.normalize_tokens(sql),
        }
    }

    fn normalize_substring(&self, sql: &str) -> String {
        let lines: Vec<String> = sql
            .split('\n')
            .map(|line| {
                if !is_clause_line(line) {
                    return line.to_string();
                }
                let mut line = line.to_string();
                for rule in &self.rules {
                    let already_qualified = rule
                        .qualifiers()
                        .any(|q| line.contains(&format!("{q}.{}", rule.column)));
                    if line.contains(rule.column.as_str()) && !already_qualified {
                        line = line.replace(rule.column.as_str(), &rule.qualified());
                    }
                }
                line
            })
            .collect();
        lines.join("\n")
    }

    fn normalize_tokens(&self, sql: &str) -> String {
        let clause_lines = clause_line_spans(sql);
        if clause_lines.is_empty() {
            return sql.to_string();
        }

        let tokens: Vec<Token> = Lexer::new(sql)
            .tokenize()
            .into_iter()
            .filter(|t| !t.is_trivia())
            .collect();

        let mut rewrites: Vec<(Span, String)> = Vec::new();
        // Parenthesis depth inside a `USING (...)` list, whose names must stay bare.
        let mut using_depth = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::LeftParen
                    if using_depth > 0 || (i > 0 && tokens[i - 1].is_keyword(Keyword::Using)) =>
                {
                    using_depth += 1;
                    continue;
                }
                TokenKind::RightParen if using_depth > 0 => {
                    using_depth -= 1;
                    continue;
                }
                _ if using_depth > 0 => continue,
                _ => {}
            }
            let TokenKind::Identifier(name) = &token.kind else {
                continue;
            };
            let Some(rule) = self.rules.find(name) else {
                continue;
            };
            if !clause_lines.iter().any(|line| token.span.within(*line)) {
                continue;
            }
            if is_bare_reference(&tokens, i) {
                rewrites.push((token.span, rule.qualified()));
            }
        }

        debug!(rewrites = rewrites.len(), "Qualified ambiguous columns");
        if rewrites.is_empty() {
            return sql.to_string();
        }

        let mut out = String::with_capacity(sql.len() + rewrites.len() * 16);
        let mut last = 0;
        for (span, replacement) in rewrites {
            out.push_str(&sql[last..span.start]);
            out.push_str(&replacement);
            last = span.end;
        }
        out.push_str(&sql[last..]);
        out
    }
}

/// Returns true if the statement joins tables.
fn has_join(sql: &str) -> bool {
    sql.to_ascii_uppercase().contains("JOIN")
}

fn is_clause_line(line: &str) -> bool {
    let upper = line.to_uppercase();
    CLAUSE_KEYWORDS.iter().any(|k| upper.contains(k))
}

/// Byte spans of the lines that contain a clause keyword.
fn clause_line_spans(sql: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in sql.split('\n') {
        let end = start + line.len();
        if is_clause_line(line) {
            spans.push(Span::new(start, end));
        }
        start = end + 1;
    }
    spans
}

/// Decides whether the identifier at `i` is an unqualified column reference.
fn is_bare_reference(tokens: &[Token], i: usize) -> bool {
    let prev = i.checked_sub(1).map(|p| &tokens[p]);
    let next = tokens.get(i + 1);

    let qualified = prev.is_some_and(|t| t.kind == TokenKind::Dot);
    let alias = prev.is_some_and(|t| t.is_keyword(Keyword::As));
    let qualifier = next.is_some_and(|t| t.kind == TokenKind::Dot);
    let function = next.is_some_and(|t| t.kind == TokenKind::LeftParen);

    !(qualified || alias || qualifier || function)
}

/// Qualifies ambiguous columns in `sql` using the canonical rule table.
#[must_use]
pub fn normalize(sql: &str) -> String {
    Normalizer::default().normalize(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy() -> Normalizer {
        Normalizer::default().with_mode(MatchMode::Substring)
    }

    #[test]
    fn test_no_join_is_identity() {
        let sql = "SELECT CustomerID FROM Orders GROUP BY CustomerID";
        assert_eq!(normalize(sql), sql);
        assert_eq!(legacy().normalize(sql), sql);
    }

    #[test]
    fn test_unterminated_literal_does_not_hide_columns() {
        let sql = "SELECT 'unterminated, CustomerID FROM Customers JOIN Orders";
        let expected = "SELECT 'unterminated, Customers.CustomerID FROM Customers JOIN Orders";
        assert_eq!(normalize(sql), expected);
        assert_eq!(legacy().normalize(sql), expected);
        assert_eq!(normalize(expected), expected);
    }

    #[test]
    fn test_unterminated_comment_on_earlier_line() {
        let sql = "SELECT Name /* oops\nFROM Customers JOIN Orders ON Customers.CustomerID = Orders.CustomerID\nORDER BY CustomerID";
        assert_eq!(
            normalize(sql),
            "SELECT Name /* oops\nFROM Customers JOIN Orders ON Customers.CustomerID = Orders.CustomerID\nORDER BY Customers.CustomerID"
        );
    }

    #[test]
    fn test_join_in_any_case_activates() {
        let sql = "SELECT CustomerID FROM Customers Join Orders USING (CustomerID)";
        assert_eq!(
            normalize(sql),
            "SELECT Customers.CustomerID FROM Customers Join Orders USING (CustomerID)"
        );
    }

    #[test]
    fn test_only_clause_lines_rewritten() {
        let sql = "SELECT Name, ProductID\nFROM Products\nJOIN OrderDetails USING (ProductID)\nWHERE ProductID > 2";
        assert_eq!(
            normalize(sql),
            "SELECT Name, Products.ProductID\nFROM Products\nJOIN OrderDetails USING (ProductID)\nWHERE ProductID > 2"
        );
    }

    #[test]
    fn test_qualified_and_aliased_references_untouched() {
        let sql = "SELECT o.CustomerID, Orders.CustomerID AS CustomerID FROM Orders o JOIN Customers c ON c.CustomerID = o.CustomerID";
        assert_eq!(normalize(sql), sql);
    }

    #[test]
    fn test_literals_comments_and_longer_names_untouched() {
        let sql = "SELECT 'CustomerID', NewCustomerIDTag, \"CustomerID\" -- CustomerID\nFROM Customers JOIN Orders ON Customers.CustomerID = Orders.CustomerID";
        assert_eq!(normalize(sql), sql);
    }

    #[test]
    fn test_case_insensitive_column_match() {
        assert_eq!(
            normalize("select customerid from Customers join Orders on Customers.CustomerID = Orders.CustomerID"),
            "select Customers.CustomerID from Customers join Orders on Customers.CustomerID = Orders.CustomerID"
        );
    }

    #[test]
    fn test_order_by_line() {
        let sql = "SELECT Customers.Name FROM Customers JOIN Orders ON Customers.CustomerID = Orders.CustomerID\nORDER BY CustomerID DESC";
        assert_eq!(
            normalize(sql),
            "SELECT Customers.Name FROM Customers JOIN Orders ON Customers.CustomerID = Orders.CustomerID\nORDER BY Customers.CustomerID DESC"
        );
    }

    #[test]
    fn test_substring_mode_rewrites_every_occurrence() {
        let sql = "SELECT CustomerID, COUNT(*)\nFROM Customers JOIN Orders ON Customers.CustomerID = Orders.CustomerID\nGROUP BY CustomerID";
        assert_eq!(
            legacy().normalize(sql),
            "SELECT Customers.CustomerID, COUNT(*)\nFROM Customers JOIN Orders ON Customers.CustomerID = Orders.CustomerID\nGROUP BY Customers.CustomerID"
        );
    }

    #[test]
    fn test_substring_mode_suppressed_by_qualified_form_on_line() {
        let sql = "SELECT CustomerID, Orders.CustomerID FROM Customers JOIN Orders";
        assert_eq!(legacy().normalize(sql), sql);
    }

    #[test]
    fn test_substring_mode_corrupts_longer_identifiers() {
        assert_eq!(
            legacy().normalize("SELECT NewCustomerIDTag FROM a JOIN b"),
            "SELECT NewCustomers.CustomerIDTag FROM a JOIN b"
        );
        assert_eq!(
            normalize("SELECT NewCustomerIDTag FROM a JOIN b"),
            "SELECT NewCustomerIDTag FROM a JOIN b"
        );
    }

    #[test]
    fn test_crlf_line_endings_preserved() {
        let sql = "SELECT ProductID\r\nFROM Products JOIN OrderDetails ON Products.ProductID = OrderDetails.ProductID\r\n";
        assert_eq!(
            normalize(sql),
            "SELECT Products.ProductID\r\nFROM Products JOIN OrderDetails ON Products.ProductID = OrderDetails.ProductID\r\n"
        );
    }

    #[test]
    fn test_idempotent_in_both_modes() {
        let inputs = [
            "SELECT CustomerID, ProductID FROM Orders JOIN OrderDetails ON Orders.OrderID = OrderDetails.OrderID\nGROUP BY CustomerID, ProductID",
            "SELECT NewCustomerIDTag FROM a JOIN b",
            "select customerid from x join y",
        ];
        for normalizer in [Normalizer::default(), legacy()] {
            for sql in inputs {
                let once = normalizer.normalize(sql);
                assert_eq!(normalizer.normalize(&once), once, "{:?}: {sql}", normalizer.mode());
            }
        }
    }

    #[test]
    fn test_empty_rules_are_identity() {
        let normalizer = Normalizer::new(AmbiguityRules::default());
        let sql = "SELECT CustomerID FROM Customers JOIN Orders";
        assert_eq!(normalizer.normalize(sql), sql);
    }
}
