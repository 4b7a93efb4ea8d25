//! Ambiguity rules: which bare column names need a table qualifier.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::SchemaDescription;

/// Qualification rule for one column name shared by several tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityRule {
    /// The bare column name, e.g. `CustomerID`.
    pub column: String,
    /// Table used to qualify bare occurrences, e.g. `Customers`.
    pub preferred: String,
    /// Qualifiers that already resolve the ambiguity, e.g. `Customers`, `Orders`.
    #[serde(default)]
    pub accepted: Vec<String>,
}

impl AmbiguityRule {
    /// Creates a rule.
    #[must_use]
    pub fn new<I, S>(column: impl Into<String>, preferred: impl Into<String>, accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            preferred: preferred.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }

    /// The qualified form bare occurrences are rewritten to.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.preferred, self.column)
    }

    /// Every qualifier that suppresses a rewrite, the preferred one first.
    pub fn qualifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.preferred.as_str()).chain(self.accepted.iter().map(String::as_str))
    }

    fn accept(&mut self, qualifier: &str) {
        if !self.qualifiers().any(|q| q.eq_ignore_ascii_case(qualifier)) {
            self.accepted.push(qualifier.to_string());
        }
    }
}

/// An ordered table of [`AmbiguityRule`]s.
///
/// Serializes as a plain JSON array of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmbiguityRules(Vec<AmbiguityRule>);

impl AmbiguityRules {
    /// Creates a rule table from a list of rules.
    #[must_use]
    pub const fn new(rules: Vec<AmbiguityRule>) -> Self {
        Self(rules)
    }

    /// The rules for the sample customer/order/product schema.
    #[must_use]
    pub fn canonical() -> Self {
        Self(vec![
            AmbiguityRule::new("CustomerID", "Customers", ["Customers", "Orders"]),
            AmbiguityRule::new("ProductID", "Products", ["Products", "OrderDetails"]),
        ])
    }

    /// Derives rules from the schema's foreign keys.
    ///
    /// A foreign key whose column has the same name as the primary key it
    /// references makes that name ambiguous in any join of the two tables.
    /// The referenced table becomes the preferred qualifier and every
    /// referencing table is accepted as well.
    #[must_use]
    pub fn from_foreign_keys(schema: &SchemaDescription) -> Self {
        let mut rules = Self::default();
        for table in &schema.tables {
            for fk in &table.foreign_keys {
                if !fk.column.eq_ignore_ascii_case(&fk.references_column) {
                    continue;
                }
                let references_key = schema
                    .table(&fk.references_table)
                    .map_or(true, |t| t.is_primary_key(&fk.references_column));
                if !references_key {
                    continue;
                }

                match rules.find_mut(&fk.references_column) {
                    Some(rule) if rule.preferred.eq_ignore_ascii_case(&fk.references_table) => {
                        rule.accept(&table.name);
                    }
                    Some(rule) => {
                        debug!(
                            column = %fk.column,
                            table = %table.name,
                            kept = %rule.preferred,
                            "Column references several tables, keeping the first"
                        );
                    }
                    None => rules.push(AmbiguityRule::new(
                        fk.references_column.clone(),
                        fk.references_table.clone(),
                        [fk.references_table.clone(), table.name.clone()],
                    )),
                }
            }
        }
        rules
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: AmbiguityRule) {
        self.0.push(rule);
    }

    /// Adds the rules of `other`.
    ///
    /// A rule for a column already present only contributes its extra
    /// accepted qualifiers; the existing preferred table is kept.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for rule in other.0 {
            match self.find_mut(&rule.column) {
                Some(existing) => {
                    for qualifier in rule.qualifiers() {
                        existing.accept(qualifier);
                    }
                }
                None => self.0.push(rule),
            }
        }
        self
    }

    /// Finds the rule for a column, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, column: &str) -> Option<&AmbiguityRule> {
        self.0.iter().find(|r| r.column.eq_ignore_ascii_case(column))
    }

    fn find_mut(&mut self, column: &str) -> Option<&mut AmbiguityRule> {
        self.0
            .iter_mut()
            .find(|r| r.column.eq_ignore_ascii_case(column))
    }

    /// Iterates over the rules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, AmbiguityRule> {
        self.0.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a AmbiguityRules {
    type Item = &'a AmbiguityRule;
    type IntoIter = std::slice::Iter<'a, AmbiguityRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<AmbiguityRule> for AmbiguityRules {
    fn from_iter<T: IntoIterator<Item = AmbiguityRule>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
