//! Generic read/write bridges to the reference database.
//!
//! Rows travel as JSON objects so callers can hand them to whatever dataframe layer they
//! use without this crate knowing the table layout.

use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::schema::TableName;

/// Renders the query returning every row of `table` as a JSON object.
pub fn read_table_sql(table: &TableName) -> String {
    format!(
        "select row_to_json(t) from {} t",
        table.as_quoted_identifier()
    )
}

/// Renders the query wrapping an arbitrary `query` so each row comes back as a JSON object.
///
/// A trailing semicolon is stripped since the query is embedded as a subquery.
pub fn read_query_sql(query: &str) -> String {
    let query = query.trim().trim_end_matches(';');
    format!("select row_to_json(q) from ({query}) q")
}

/// Renders the statement appending a JSON array of rows to `table`.
///
/// Columns are matched by name through `jsonb_populate_recordset`; keys without a matching
/// column are ignored and missing keys become `null`.
pub fn write_rows_sql(table: &TableName) -> String {
    let table = table.as_quoted_identifier();
    format!("insert into {table} select * from jsonb_populate_recordset(null::{table}, $1)")
}

/// Reads every row of `table`.
pub async fn read_table(pool: &PgPool, table: &TableName) -> Result<Vec<Value>, sqlx::Error> {
    fetch_json_rows(pool, &read_table_sql(table)).await
}

/// Reads the rows produced by `query`.
pub async fn read_query(pool: &PgPool, query: &str) -> Result<Vec<Value>, sqlx::Error> {
    fetch_json_rows(pool, &read_query_sql(query)).await
}

/// Appends `rows` to `table` and returns the number of rows written.
///
/// Nothing is sent to the database when `rows` is empty.
pub async fn write_rows(
    pool: &PgPool,
    table: &TableName,
    rows: &[Value],
) -> Result<u64, sqlx::Error> {
    if rows.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(&write_rows_sql(table))
        .bind(Value::Array(rows.to_vec()))
        .execute(pool)
        .await?;

    info!(
        table = %table,
        rows = result.rows_affected(),
        "appended rows to reference table"
    );

    Ok(result.rows_affected())
}

/// Executes a data-modifying `statement` in its own transaction and returns the number of
/// affected rows.
pub async fn execute_update(pool: &PgPool, statement: &str) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::raw_sql(statement).execute(&mut *tx).await?;

    tx.commit().await?;

    debug!(rows = result.rows_affected(), "executed reference update");

    Ok(result.rows_affected())
}

async fn fetch_json_rows(pool: &PgPool, query: &str) -> Result<Vec<Value>, sqlx::Error> {
    let rows = sqlx::query(query).fetch_all(pool).await?;

    rows.iter()
        .map(|row| row.try_get::<Value, _>(0))
        .collect()
}
