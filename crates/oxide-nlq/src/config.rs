//! Assistant configuration and ambiguity rule loading.

use std::path::{Path, PathBuf};

use oxide_nlq_core::{AmbiguityRules, MatchMode, Normalizer, SchemaDescription};
use tracing::{debug, info};

use crate::error::{AssistantError, Result};
use crate::model::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

/// Default database location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:company_database.db";

/// Settings the assistant is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// SQLite connection string.
    pub database_url: String,
    /// Ollama server base URL.
    pub ollama_url: String,
    /// Model tag to generate with.
    pub model: String,
    /// Optional JSON file with extra ambiguity rules.
    pub rules_path: Option<PathBuf>,
    /// Use line-level substring replacement instead of token matching.
    pub legacy_substring: bool,
    /// Derive rules from the schema's foreign keys.
    pub derive_rules: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            rules_path: None,
            legacy_substring: false,
            derive_rules: true,
        }
    }
}

impl AssistantConfig {
    /// The normalizer match mode selected by this configuration.
    #[must_use]
    pub const fn match_mode(&self) -> MatchMode {
        if self.legacy_substring {
            MatchMode::Substring
        } else {
            MatchMode::Token
        }
    }

    /// Builds the normalizer for `schema`.
    ///
    /// Rules are layered: the canonical table, then the rule file, then
    /// rules derived from foreign keys. Earlier layers keep their preferred
    /// table; later layers only add accepted qualifiers.
    pub fn build_normalizer(&self, schema: &SchemaDescription) -> Result<Normalizer> {
        let mut rules = AmbiguityRules::canonical();

        if let Some(path) = &self.rules_path {
            rules = rules.merge(load_rules(path)?);
        }

        if self.derive_rules {
            let derived = AmbiguityRules::from_foreign_keys(schema);
            debug!(derived = derived.len(), "Derived ambiguity rules from foreign keys");
            rules = rules.merge(derived);
        }

        info!(rules = rules.len(), mode = ?self.match_mode(), "Ambiguity rules ready");
        Ok(Normalizer::new(rules).with_mode(self.match_mode()))
    }
}

/// Loads an ambiguity rule table from a JSON file.
///
/// The file holds an array of `{"column", "preferred", "accepted"}` objects.
pub fn load_rules(path: &Path) -> Result<AmbiguityRules> {
    let invalid = |message: String| AssistantError::InvalidRules {
        path: path.to_path_buf(),
        message,
    };

    let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let rules: AmbiguityRules = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    if let Some(rule) = rules.iter().find(|r| r.column.trim().is_empty() || r.preferred.trim().is_empty()) {
        return Err(invalid(format!(
            "rule for column '{}' needs both a column and a preferred table",
            rule.column
        )));
    }

    debug!(path = %path.display(), rules = rules.len(), "Loaded ambiguity rules");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use oxide_nlq_core::{ColumnDescription, ForeignKey, TableDescription};
    use tempfile::NamedTempFile;

    use super::*;

    fn rule_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.database_url, "sqlite:company_database.db");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.model, "sqlcoder:15b");
        assert_eq!(config.match_mode(), MatchMode::Token);
    }

    #[test]
    fn test_load_rules() {
        let file = rule_file(
            r#"[{"column": "EmployeeID", "preferred": "Employees", "accepted": ["Employees", "Orders"]}]"#,
        );
        let rules = load_rules(file.path()).unwrap();
        let rule = rules.find("EmployeeID").unwrap();
        assert_eq!(rule.preferred, "Employees");
        assert_eq!(rule.qualifiers().collect::<Vec<_>>(), vec!["Employees", "Employees", "Orders"]);
    }

    #[test]
    fn test_load_rules_rejects_bad_json() {
        let file = rule_file("{not json");
        let err = load_rules(file.path()).unwrap_err();
        assert!(matches!(err, AssistantError::InvalidRules { .. }));
    }

    #[test]
    fn test_load_rules_rejects_blank_column() {
        let file = rule_file(r#"[{"column": " ", "preferred": "Employees", "accepted": []}]"#);
        assert!(matches!(
            load_rules(file.path()),
            Err(AssistantError::InvalidRules { .. })
        ));
    }

    #[test]
    fn test_load_rules_missing_file() {
        let err = load_rules(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid rule file '/nonexistent/rules.json'"));
    }

    #[test]
    fn test_build_normalizer_layers_rules() {
        let schema = SchemaDescription::new(vec![
            TableDescription::new("Employees")
                .column(ColumnDescription::new("EmployeeID", "INTEGER").primary_key()),
            TableDescription::new("Shifts")
                .column(ColumnDescription::new("EmployeeID", "INTEGER"))
                .foreign_key(ForeignKey::new("EmployeeID", "Employees", "EmployeeID")),
        ]);

        let normalizer = AssistantConfig::default().build_normalizer(&schema).unwrap();
        assert!(normalizer.rules().find("CustomerID").is_some());
        assert_eq!(normalizer.rules().find("EmployeeID").unwrap().preferred, "Employees");

        let config = AssistantConfig {
            derive_rules: false,
            legacy_substring: true,
            ..AssistantConfig::default()
        };
        let normalizer = config.build_normalizer(&schema).unwrap();
        assert!(normalizer.rules().find("EmployeeID").is_none());
        assert_eq!(normalizer.mode(), MatchMode::Substring);
    }
}
