//! Database schema description shared by prompt building and rule derivation.
//!
//! The description is produced by whatever introspects the database; this
//! crate only formats it and reads foreign keys out of it.

use serde::{Deserialize, Serialize};

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    /// Column name.
    pub name: String,
    /// Declared type, as reported by the database (may be empty).
    pub data_type: String,
    /// Whether the column is (part of) the primary key.
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDescription {
    /// Creates a non-key column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
        }
    }

    /// Marks the column as primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// A single-column foreign key declared on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing column in the owning table.
    pub column: String,
    /// Referenced table.
    pub references_table: String,
    /// Referenced column.
    pub references_column: String,
}

impl ForeignKey {
    /// Creates a foreign key `column -> table(references_column)`.
    #[must_use]
    pub fn new(
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            references_table: references_table.into(),
            references_column: references_column.into(),
        }
    }
}

/// A table with its columns and foreign keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescription>,
    /// Foreign keys in declaration order.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableDescription {
    /// Creates a table with no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDescription) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Returns true if `column` is a primary key column of this table.
    #[must_use]
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.primary_key && c.name.eq_ignore_ascii_case(column))
    }
}

/// The tables of a database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    /// Tables in the order the database lists them.
    pub tables: Vec<TableDescription>,
}

impl SchemaDescription {
    /// Creates a description from a list of tables.
    #[must_use]
    pub const fn new(tables: Vec<TableDescription>) -> Self {
        Self { tables }
    }

    /// Looks up a table by name, ignoring ASCII case.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescription> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Renders the schema for display to a user.
    #[must_use]
    pub fn display_text(&self) -> String {
        let mut out = String::from("DATABASE SCHEMA:\n\n");
        for table in &self.tables {
            out.push_str(&format!("TABLE: {}\n", table.name));
            for column in &table.columns {
                let key = if column.primary_key { "PRIMARY KEY" } else { "" };
                out.push_str(&format!(
                    "  - {} ({}) {}\n",
                    column.name, column.data_type, key
                ));
            }
            out.push('\n');
        }
        out
    }

    /// Renders the schema as context for a generation prompt.
    #[must_use]
    pub fn prompt_context(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&format!("Table: {}\n", table.name));
            out.push_str("Columns:\n");
            for column in &table.columns {
                out.push_str(&format!("  - {} ({})\n", column.name, column.data_type));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> TableDescription {
        TableDescription::new("Customers")
            .column(ColumnDescription::new("CustomerID", "INTEGER").primary_key())
            .column(ColumnDescription::new("Name", "TEXT"))
    }

    #[test]
    fn test_display_text() {
        let schema = SchemaDescription::new(vec![customers()]);
        assert_eq!(
            schema.display_text(),
            "DATABASE SCHEMA:\n\nTABLE: Customers\n  - CustomerID (INTEGER) PRIMARY KEY\n  - Name (TEXT) \n\n"
        );
    }

    #[test]
    fn test_prompt_context() {
        let schema = SchemaDescription::new(vec![customers()]);
        assert_eq!(
            schema.prompt_context(),
            "Table: Customers\nColumns:\n  - CustomerID (INTEGER)\n  - Name (TEXT)\n\n"
        );
    }

    #[test]
    fn test_lookup_and_primary_key() {
        let schema = SchemaDescription::new(vec![customers()]);
        let table = schema.table("customers").unwrap();
        assert!(table.is_primary_key("customerid"));
        assert!(!table.is_primary_key("Name"));
        assert!(schema.table("Orders").is_none());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{"tables":[{"name":"T","columns":[{"name":"a","data_type":"INT"}]}]}"#;
        let schema: SchemaDescription = serde_json::from_str(json).unwrap();
        assert!(!schema.tables[0].columns[0].primary_key);
        assert!(schema.tables[0].foreign_keys.is_empty());
    }
}
