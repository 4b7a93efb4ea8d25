//! Isolation of a single SQL statement from a free-form model response.
//!
//! Language models rarely answer with bare SQL. Depending on the model and
//! the run, the statement may be wrapped in a Markdown fence, followed by an
//! explanation, or preceded by a chatty introduction. [`Extractor`] tries a
//! fixed sequence of strategies and stops at the first one that applies:
//!
//! 1. the first ```` ```sql ```` fenced block,
//! 2. the first plain ```` ``` ```` fenced block,
//! 3. truncation at explanation markers, followed by
//! 4. removal of conversational lines.
//!
//! Fence content is trusted verbatim: markers and prefixes are only applied
//! when the response has no fenced block at all. Nothing here checks that
//! the result is valid SQL; the database reports that when it runs it.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{ExtractError, Result};

static SQL_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```sql\s*(.*?)\s*```").expect("valid SQL fence pattern"));

static PLAIN_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("valid fence pattern"));

/// Markers that introduce an explanation after the SQL, in application order.
pub const DEFAULT_EXPLANATION_MARKERS: &[&str] = &[
    "### Explain",
    "# Explanation",
    "-- Explanation",
    "/* Explanation",
    "-- This query",
    "-- The query",
    "-- First",
    "-- Here",
    "# This",
];

/// Line openings that mark conversational padding. Compared case-insensitively.
pub const DEFAULT_SKIP_PREFIXES: &[&str] = &[
    "Sure!",
    "Here is",
    "Here's",
    "The SQL",
    "SQL query",
    "I'll",
    "Let me",
    "To answer",
    "For this",
    "This query",
];

/// Which strategy produced a [`CandidateSql`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Interior of the first ```` ```sql ```` block.
    SqlFence,
    /// Interior of the first untagged fenced block.
    PlainFence,
    /// Marker truncation and prefix-line filtering of unfenced text.
    Heuristic,
}

/// A string believed to be a SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSql {
    /// The extracted statement, trimmed.
    pub sql: String,
    /// How it was found.
    pub strategy: Strategy,
}

/// Marker and prefix lists used by the unfenced strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Applied in order; each truncates the text left by the previous ones.
    pub explanation_markers: Vec<String>,
    /// A line whose trimmed, lowercased text starts with one of these is dropped.
    pub skip_prefixes: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            explanation_markers: DEFAULT_EXPLANATION_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            skip_prefixes: DEFAULT_SKIP_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }
}

/// Extracts SQL from raw model output.
#[derive(Debug, Clone)]
pub struct Extractor {
    markers: Vec<String>,
    /// Stored lowercased.
    prefixes: Vec<String>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl Extractor {
    /// Creates an extractor with the given marker and prefix lists.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            markers: config.explanation_markers,
            prefixes: config
                .skip_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Isolates the SQL statement in `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Empty`] if the winning strategy leaves nothing.
    pub fn extract(&self, raw: &str) -> Result<CandidateSql> {
        let candidate = self.extract_lenient(raw);
        debug!(
            strategy = ?candidate.strategy,
            len = candidate.sql.len(),
            "Extracted candidate SQL"
        );
        if candidate.sql.is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(candidate)
    }

    /// Runs the strategies and returns whatever the winner produced, even if empty.
    #[must_use]
    pub fn extract_lenient(&self, raw: &str) -> CandidateSql {
        if let Some(sql) = fenced(&SQL_FENCE, raw) {
            return CandidateSql {
                sql,
                strategy: Strategy::SqlFence,
            };
        }

        if let Some(sql) = fenced(&PLAIN_FENCE, raw) {
            return CandidateSql {
                sql,
                strategy: Strategy::PlainFence,
            };
        }

        let truncated = self.truncate_at_markers(raw);
        CandidateSql {
            sql: self.drop_conversational_lines(&truncated),
            strategy: Strategy::Heuristic,
        }
    }

    /// Cuts `text` before each marker in declared order.
    ///
    /// Every marker is looked up in what the previous markers left, so a
    /// later marker can shorten the text further.
    #[must_use]
    pub fn truncate_at_markers(&self, text: &str) -> String {
        let mut text = text.to_string();
        for marker in &self.markers {
            if let Some(idx) = text.find(marker.as_str()) {
                debug!(marker = %marker, offset = idx, "Truncating at explanation marker");
                text = text[..idx].trim().to_string();
            }
        }
        text
    }

    /// Drops blank lines and lines that open with a conversational prefix.
    #[must_use]
    pub fn drop_conversational_lines(&self, text: &str) -> String {
        let kept: Vec<&str> = text
            .split('\n')
            .filter(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return false;
                }
                let lowered = trimmed.to_lowercase();
                !self.prefixes.iter().any(|p| lowered.starts_with(p.as_str()))
            })
            .collect();
        kept.join("\n").trim().to_string()
    }
}

fn fenced(pattern: &Regex, raw: &str) -> Option<String> {
    pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Extracts SQL from `raw` with the default marker and prefix lists.
///
/// # Errors
///
/// Returns [`ExtractError::Empty`] if no SQL is left.
pub fn extract(raw: &str) -> Result<CandidateSql> {
    Extractor::default().extract(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(raw: &str) -> String {
        Extractor::default().extract_lenient(raw).sql
    }

    #[test]
    fn test_sql_fence() {
        let raw = "Here you go:\n```sql\nSELECT * FROM Customers;\n```\nHope it helps!";
        let candidate = extract(raw).unwrap();
        assert_eq!(candidate.sql, "SELECT * FROM Customers;");
        assert_eq!(candidate.strategy, Strategy::SqlFence);
    }

    #[test]
    fn test_sql_fence_tag_is_case_sensitive() {
        let raw = "```SQL\nSELECT 1\n```";
        let candidate = extract(raw).unwrap();
        assert_eq!(candidate.strategy, Strategy::PlainFence);
        assert_eq!(candidate.sql, "SQL\nSELECT 1");
    }

    #[test]
    fn test_tagged_fence_wins_over_earlier_plain_fence() {
        let raw = "```\nnot this\n```\nthen\n```sql\nSELECT 2\n```";
        let candidate = extract(raw).unwrap();
        assert_eq!(candidate.sql, "SELECT 2");
        assert_eq!(candidate.strategy, Strategy::SqlFence);
    }

    #[test]
    fn test_plain_fence() {
        assert_eq!(sql("Answer:\n```\n  SELECT Name\n  FROM Products\n```"), "SELECT Name\n  FROM Products");
    }

    #[test]
    fn test_first_fence_of_several() {
        assert_eq!(sql("```sql\nSELECT 1\n```\n```sql\nSELECT 2\n```"), "SELECT 1");
    }

    #[test]
    fn test_fence_content_is_not_truncated() {
        let raw = "```sql\nSELECT 1 -- This query counts\n```";
        assert_eq!(sql(raw), "SELECT 1 -- This query counts");
    }

    #[test]
    fn test_empty_fence_is_empty_extraction() {
        assert_eq!(extract("```sql\n```"), Err(ExtractError::Empty));
    }

    #[test]
    fn test_marker_truncation() {
        let raw = "SELECT * FROM Orders\n# Explanation\nThis selects every order.";
        let candidate = extract(raw).unwrap();
        assert_eq!(candidate.sql, "SELECT * FROM Orders");
        assert_eq!(candidate.strategy, Strategy::Heuristic);
    }

    #[test]
    fn test_triple_hash_explanation_leaves_hash_residue() {
        // "### Explanation" does not contain "### Explain"; "# Explanation"
        // matches at the third '#', leaving "##" behind.
        let raw = "SELECT * FROM Orders\n### Explanation\nThis selects every order.";
        assert_eq!(sql(raw), "SELECT * FROM Orders\n##");
    }

    #[test]
    fn test_marker_truncation_is_cumulative() {
        let extractor = Extractor::default();
        let text = "SELECT a\n# This part\nFROM t\n-- Explanation: x";
        // "-- Explanation" fires first, then "# This" cuts what is left.
        assert_eq!(extractor.truncate_at_markers(text), "SELECT a");
    }

    #[test]
    fn test_marker_inside_sql_still_truncates() {
        assert_eq!(
            sql("SELECT '-- Here' AS label FROM t"),
            "SELECT '"
        );
    }

    #[test]
    fn test_prefix_lines_dropped() {
        let raw = "Sure! I can help.\nHere's the query:\n\nSELECT Name\nFROM Employees\n";
        assert_eq!(sql(raw), "SELECT Name\nFROM Employees");
    }

    #[test]
    fn test_prefix_match_ignores_case_and_indent() {
        let extractor = Extractor::default();
        assert_eq!(
            extractor.drop_conversational_lines("   HERE IS\nlet me think\nSELECT * FROM X"),
            "SELECT * FROM X"
        );
    }

    #[test]
    fn test_only_chatter_is_empty() {
        assert_eq!(extract("Sure!\nLet me think about it."), Err(ExtractError::Empty));
        assert_eq!(extract(""), Err(ExtractError::Empty));
    }

    #[test]
    fn test_custom_config() {
        let extractor = Extractor::new(ExtractorConfig {
            explanation_markers: vec!["Note:".to_string()],
            skip_prefixes: vec!["ANSWER".to_string()],
        });
        let candidate = extractor
            .extract("answer follows\nSELECT 1\nNote: trivial")
            .unwrap();
        assert_eq!(candidate.sql, "SELECT 1");
    }
}
