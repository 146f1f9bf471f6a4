use config::shared::{IntoConnectOptions, PgConnectionConfig};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

/// Connects to the reference database with a pool bounded by `min_connections` and
/// `max_connections`.
pub async fn connect_to_reference_database(
    config: &PgConnectionConfig,
    min_connections: u32,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let options = config.with_db();

    let pool = PgPoolOptions::new()
        .min_connections(min_connections)
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    debug!(
        host = %config.host,
        database = %config.name,
        "connected to reference database"
    );

    Ok(pool)
}

/// Executes a complete SQL statement and returns the number of affected rows.
///
/// The statement is sent as-is, so callers must only pass text they rendered from
/// validated parts.
pub async fn execute_statement(pool: &PgPool, statement: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::raw_sql(statement).execute(pool).await?;

    Ok(result.rows_affected())
}

/// Runs a `select count(*) ...` style statement and returns its single value.
pub async fn fetch_count(pool: &PgPool, query: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(query).fetch_one(pool).await
}
