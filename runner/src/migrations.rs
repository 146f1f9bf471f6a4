use config::shared::{IntoConnectOptions, PgConnectionConfig, SemaphoreConfig};
use pg_escape::quote_identifier;
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const NUM_POOL_CONNECTIONS: u32 = 1;

/// Creates the lock registry schema and table when missing.
///
/// Concurrent `create schema if not exists` calls can race on a fresh database, so this runs
/// from the `migrate` command only.
///
/// Every connection of the migration pool uses the registry schema as its search path, so
/// both the registry table and the `_sqlx_migrations` bookkeeping table land there.
pub async fn migrate_lock_registry(
    connection_config: &PgConnectionConfig,
    semaphore_config: &SemaphoreConfig,
) -> Result<(), sqlx::migrate::MigrateError> {
    let schema = quote_identifier(&semaphore_config.schema).to_string();

    let pool = PgPoolOptions::new()
        .max_connections(NUM_POOL_CONNECTIONS)
        .min_connections(NUM_POOL_CONNECTIONS)
        .after_connect(move |conn, _meta| {
            let schema = schema.clone();
            Box::pin(async move {
                conn.execute(format!("create schema if not exists {schema};").as_str())
                    .await?;
                conn.execute(format!("set search_path = {schema};").as_str())
                    .await?;
                Ok(())
            })
        })
        .connect_with(connection_config.with_db())
        .await?;

    let migrator = sqlx::migrate!("./migrations");
    migrator.run(&pool).await?;

    info!(schema = %semaphore_config.schema, "lock registry migrations applied");

    Ok(())
}
