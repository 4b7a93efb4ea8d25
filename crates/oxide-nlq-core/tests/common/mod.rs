#![allow(dead_code)]

use oxide_nlq_core::{AmbiguityRules, MatchMode, Normalizer, extract};

/// Runs extraction and normalization the way the assistant does.
pub fn pipeline(raw: &str) -> String {
    let candidate = extract(raw).unwrap_or_else(|e| panic!("Failed to extract from: {raw}\nError: {e}"));
    Normalizer::default().normalize(&candidate.sql)
}

/// A normalizer reproducing plain substring replacement.
pub fn substring_normalizer() -> Normalizer {
    Normalizer::new(AmbiguityRules::canonical()).with_mode(MatchMode::Substring)
}

/// Asserts `normalize(normalize(s)) == normalize(s)`.
pub fn assert_idempotent(normalizer: &Normalizer, sql: &str) {
    let once = normalizer.normalize(sql);
    let twice = normalizer.normalize(&once);
    assert_eq!(
        once, twice,
        "Normalization is not idempotent.\n  Input:  {sql}\n  Once:   {once}\n  Twice:  {twice}"
    );
}
