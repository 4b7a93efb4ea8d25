//! SQLite access: bootstrap, introspection and query execution.

use std::str::FromStr;

use oxide_nlq_core::{ColumnDescription, ForeignKey, SchemaDescription, TableDescription};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::render::QueryResult;
use crate::sample;

/// Lists user tables in creation order.
const LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid";

/// Rendering of SQL NULL in result tables.
pub const NULL_TEXT: &str = "NULL";

/// A SQLite database the assistant introspects and queries.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the database at `url`, creating the file if it does not exist.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        debug!(url = %url, "Connected to database");
        Ok(Self::new(pool))
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the names of all user tables.
    pub async fn table_names(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Creates and fills the sample tables if the database has no tables.
    ///
    /// Returns `true` if the sample data was created.
    pub async fn bootstrap_sample(&self) -> Result<bool> {
        if !self.table_names().await?.is_empty() {
            debug!("Database already has tables, skipping sample bootstrap");
            return Ok(false);
        }

        info!("Creating sample database");
        let mut tx = self.pool.begin().await?;

        for ddl in sample::SAMPLE_TABLES_SQL {
            sqlx::query(ddl).execute(&mut *tx).await?;
        }

        for &(id, name, email, phone, join_date) in sample::CUSTOMERS {
            sqlx::query("INSERT INTO Customers VALUES (?, ?, ?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(email)
                .bind(phone)
                .bind(join_date)
                .execute(&mut *tx)
                .await?;
        }

        for &(id, name, category, price, stock) in sample::PRODUCTS {
            sqlx::query("INSERT INTO Products VALUES (?, ?, ?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(category)
                .bind(price)
                .bind(stock)
                .execute(&mut *tx)
                .await?;
        }

        for &(id, name, position, salary, hire_date) in sample::EMPLOYEES {
            sqlx::query("INSERT INTO Employees VALUES (?, ?, ?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(position)
                .bind(salary)
                .bind(hire_date)
                .execute(&mut *tx)
                .await?;
        }

        for &(id, customer_id, order_date, total) in sample::ORDERS {
            sqlx::query("INSERT INTO Orders VALUES (?, ?, ?, ?)")
                .bind(id)
                .bind(customer_id)
                .bind(order_date)
                .bind(total)
                .execute(&mut *tx)
                .await?;
        }

        for &(id, order_id, product_id, quantity, unit_price) in sample::ORDER_DETAILS {
            sqlx::query("INSERT INTO OrderDetails VALUES (?, ?, ?, ?, ?)")
                .bind(id)
                .bind(order_id)
                .bind(product_id)
                .bind(quantity)
                .bind(unit_price)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Describes every user table: columns, primary keys and foreign keys.
    pub async fn describe(&self) -> Result<SchemaDescription> {
        let mut tables = Vec::new();

        for name in self.table_names().await? {
            let quoted = quote_identifier(&name);

            // (cid, name, type, notnull, dflt_value, pk)
            let columns: Vec<(i64, String, String, i64, Option<String>, i64)> =
                sqlx::query_as(&format!("PRAGMA table_info({quoted})"))
                    .fetch_all(&self.pool)
                    .await?;

            // (id, seq, table, from, to, on_update, on_delete, match)
            let foreign_keys: Vec<(i64, i64, String, String, Option<String>, String, String, String)> =
                sqlx::query_as(&format!("PRAGMA foreign_key_list({quoted})"))
                    .fetch_all(&self.pool)
                    .await?;

            let mut table = TableDescription::new(name);
            for (_, column, data_type, _, _, pk) in columns {
                let mut column = ColumnDescription::new(column, data_type);
                column.primary_key = pk > 0;
                table = table.column(column);
            }
            for (_, _, references_table, from, to, _, _, _) in foreign_keys {
                // SQLite leaves `to` NULL when the parent key is implicit.
                let to = to.unwrap_or_else(|| from.clone());
                table = table.foreign_key(ForeignKey::new(from, references_table, to));
            }
            tables.push(table);
        }

        debug!(tables = tables.len(), "Introspected schema");
        Ok(SchemaDescription::new(tables))
    }

    /// Runs `sql` and collects every row as text.
    ///
    /// The raw [`sqlx::Error`] is returned so callers can show it next to
    /// the statement that caused it.
    pub async fn run(&self, sql: &str) -> std::result::Result<QueryResult, sqlx::Error> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows.iter().map(row_text).collect();

        Ok(QueryResult::new(columns, rows))
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn row_text(row: &SqliteRow) -> Vec<String> {
    (0..row.len()).map(|i| cell_text(row, i)).collect()
}

/// Decodes a cell by its runtime storage class.
fn cell_text(row: &SqliteRow, i: usize) -> String {
    fn show<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| NULL_TEXT.to_string(), |v| v.to_string())
    }

    if let Ok(value) = row.try_get::<Option<i64>, _>(i) {
        return show(value);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(i) {
        return show(value);
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(i) {
        return show(value);
    }
    match row.try_get::<Option<Vec<u8>>, _>(i) {
        Ok(Some(bytes)) => format!("<{} bytes>", bytes.len()),
        _ => NULL_TEXT.to_string(),
    }
}
