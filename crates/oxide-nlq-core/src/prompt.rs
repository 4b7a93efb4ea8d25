//! Generation prompt for the model service.

use crate::schema::SchemaDescription;

/// Instructions appended after the question, in order.
pub const INSTRUCTIONS: &[&str] = &[
    "Generate ONLY the {dialect} SQL query that answers the user's question.",
    "DO NOT include any explanations, comments, or markdown formatting.",
    "Always use fully qualified column names (table_name.column_name) when joining tables, and full table names.",
    "Your response should contain NOTHING except the SQL code itself.",
    "Double check that every column you write exists!",
];

/// Builds prompts that ask a model for a single SQL statement.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    dialect: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("SQLite")
    }
}

impl PromptBuilder {
    /// Creates a builder for the named SQL dialect.
    #[must_use]
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
        }
    }

    /// Builds the prompt for `question` against `schema`.
    #[must_use]
    pub fn build(&self, schema: &SchemaDescription, question: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str("### Write only the SQL query without any explanations or additional text.\n");
        prompt.push_str(&format!(
            "{} database tables, with their properties:\n\n",
            self.dialect
        ));
        prompt.push_str(&schema.prompt_context());
        prompt.push_str("\n### A user asks the following question:\n");
        prompt.push_str(question.trim());
        prompt.push_str("\n\n### Important instructions:\n");
        for (n, instruction) in INSTRUCTIONS.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. {}\n",
                n + 1,
                instruction.replace("{dialect}", &self.dialect)
            ));
        }
        prompt.push_str("\n\nSQL query:\n");
        prompt
    }
}

/// Builds a SQLite prompt for `question` against `schema`.
#[must_use]
pub fn build_prompt(schema: &SchemaDescription, question: &str) -> String {
    PromptBuilder::default().build(schema, question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDescription, TableDescription};

    fn schema() -> SchemaDescription {
        SchemaDescription::new(vec![TableDescription::new("Employees")
            .column(ColumnDescription::new("EmployeeID", "INTEGER").primary_key())
            .column(ColumnDescription::new("Salary", "DECIMAL(10,2)"))])
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let prompt = build_prompt(&schema(), "  Employees with above-average salaries \n");
        let header = prompt.find("### Write only the SQL query").unwrap();
        let tables = prompt.find("Table: Employees\nColumns:\n  - EmployeeID (INTEGER)\n  - Salary (DECIMAL(10,2))").unwrap();
        let question = prompt
            .find("### A user asks the following question:\nEmployees with above-average salaries\n")
            .unwrap();
        let rules = prompt.find("### Important instructions:\n1. Generate ONLY the SQLite SQL query").unwrap();
        assert!(header < tables && tables < question && question < rules);
        assert!(prompt.contains("SQLite database tables, with their properties:\n\nTable: Employees\n"));
        assert!(prompt.contains("4. Your response should contain NOTHING except the SQL code itself.\n5. "));
        assert!(prompt.contains("5. Double check that every column you write exists!"));
        assert!(prompt.ends_with("SQL query:\n"));
    }

    #[test]
    fn test_dialect_name() {
        let prompt = PromptBuilder::new("PostgreSQL").build(&schema(), "q");
        assert!(prompt.contains("PostgreSQL database tables"));
        assert!(prompt.contains("1. Generate ONLY the PostgreSQL SQL query"));
    }
}
