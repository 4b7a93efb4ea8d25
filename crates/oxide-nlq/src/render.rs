//! Plain-text rendering of query results.

/// Message shown when a query returns no rows.
pub const NO_RESULTS: &str = "No results found.";

/// Rows returned by a query, every cell already rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names in select order.
    pub columns: Vec<String>,
    /// Row cells, one entry per column.
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    /// Creates a result from column names and rows.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Returns true if the query returned no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renders `result` as a right-aligned text table.
///
/// An empty result renders as [`NO_RESULTS`].
#[must_use]
pub fn render_table(result: &QueryResult) -> String {
    if result.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &result.rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = String::new();
    write_line(&mut out, &result.columns, &widths);
    for row in &result.rows {
        write_line(&mut out, row, &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, &width) in widths.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        let cell = cells.get(i).map_or("", String::as_str);
        out.push_str(&format!("{cell:>width$}"));
    }
    out.push('\n');
}

/// Renders a failed execution together with the statement that caused it.
#[must_use]
pub fn render_execution_error(message: &str, sql: &str) -> String {
    format!("Error executing SQL: {message}\n\nSQL query attempted:\n{sql}")
}
