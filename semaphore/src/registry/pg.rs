use sqlx::PgPool;

use crate::error::LockResult;
use crate::registry::SqlExecutor;

/// [`SqlExecutor`] backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl SqlExecutor for PgExecutor {
    async fn execute(&self, statement: String) -> LockResult<u64> {
        let rows = postgres::db::execute_statement(&self.pool, &statement).await?;

        Ok(rows)
    }

    async fn query_count(&self, query: String) -> LockResult<i64> {
        let count = postgres::db::fetch_count(&self.pool, &query).await?;

        Ok(count)
    }
}
