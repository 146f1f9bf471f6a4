use std::future::Future;

use config::shared::SemaphoreConfig;
use postgres::schema::TableName;
use tracing::debug;

use crate::error::{ErrorKind, LockResult};
use crate::lock_error;
use crate::registry::LockRegistry;
use crate::types::{CheckPath, LockRecord, RunId};

/// Runs fully rendered SQL text against the store hosting the registry table.
pub trait SqlExecutor {
    /// Executes `statement` and returns the number of affected rows.
    fn execute(&self, statement: String) -> impl Future<Output = LockResult<u64>> + Send;

    /// Runs a single-value `COUNT(*)` query.
    fn query_count(&self, query: String) -> impl Future<Output = LockResult<i64>> + Send;
}

/// Location of the registry table and the statements issued against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTable {
    name: TableName,
}

impl LockTable {
    /// The conventional `{catalog}.internal_tp.tp_run_lock_plc` table.
    pub fn new(catalog: impl Into<String>) -> Self {
        Self::with_name(TableName::new(
            Some(catalog.into()),
            Some(config::shared::DEFAULT_LOCK_SCHEMA.to_string()),
            config::shared::LOCK_TABLE.to_string(),
        ))
    }

    pub fn with_name(name: TableName) -> Self {
        Self { name }
    }

    /// The registry table in the configured catalog and schema.
    pub fn from_config(config: &SemaphoreConfig) -> Self {
        Self::with_name(TableName::new(
            Some(config.catalog.clone()),
            Some(config.schema.clone()),
            config::shared::LOCK_TABLE.to_string(),
        ))
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    /// Renders one multi-row insert, or `None` when there is nothing to insert.
    pub fn insert_statement(&self, records: &[LockRecord]) -> Option<String> {
        if records.is_empty() {
            return None;
        }

        let values = records
            .iter()
            .map(|record| {
                format!(
                    "({}, {}, {}, '{}')",
                    record.run_id,
                    CheckPath::from_paths([record.lock_path.as_str()]),
                    record.lock_status,
                    record.created_at.format("%Y-%m-%d %H:%M:%S%.6f%:z")
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        Some(format!(
            "INSERT INTO {} (run_id, lock_path, lock_sttus, creat_date) VALUES {values}",
            self.name.as_quoted_identifier()
        ))
    }

    pub fn count_statement(&self, run_id: RunId, check_path: &CheckPath) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE run_id <> {run_id} AND lock_path IN ({})",
            self.name.as_quoted_identifier(),
            check_path.as_sql_list()
        )
    }

    pub fn delete_statement(&self, run_id: RunId, check_path: &CheckPath) -> String {
        format!(
            "DELETE FROM {} WHERE run_id = {run_id} AND lock_path IN ({})",
            self.name.as_quoted_identifier(),
            check_path.as_sql_list()
        )
    }
}

/// Lock registry issuing SQL through an [`SqlExecutor`].
///
/// An empty check path never reaches the executor since `IN ()` is not valid SQL; it
/// counts and deletes nothing.
#[derive(Debug, Clone)]
pub struct SqlLockRegistry<E> {
    executor: E,
    table: LockTable,
}

impl<E> SqlLockRegistry<E> {
    pub fn new(executor: E, table: LockTable) -> Self {
        Self { executor, table }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn table(&self) -> &LockTable {
        &self.table
    }
}

impl<E> LockRegistry for SqlLockRegistry<E>
where
    E: SqlExecutor + Sync,
{
    async fn insert_locks(&self, records: Vec<LockRecord>) -> LockResult<()> {
        let Some(statement) = self.table.insert_statement(&records) else {
            debug!("no lock rows to insert");
            return Ok(());
        };

        self.executor.execute(statement).await?;

        Ok(())
    }

    async fn count_conflicting(&self, run_id: RunId, check_path: &CheckPath) -> LockResult<u64> {
        if check_path.is_empty() {
            return Ok(0);
        }

        let count = self
            .executor
            .query_count(self.table.count_statement(run_id, check_path))
            .await?;

        u64::try_from(count).map_err(|err| {
            lock_error!(
                ErrorKind::ConversionError,
                "Registry returned a negative count",
                format!("count {count} for run {run_id}"),
                source: err
            )
        })
    }

    async fn delete_locks(&self, run_id: RunId, check_path: &CheckPath) -> LockResult<u64> {
        if check_path.is_empty() {
            return Ok(0);
        }

        self.executor
            .execute(self.table.delete_statement(run_id, check_path))
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::test_utils::ScriptedExecutor;

    fn registry() -> SqlLockRegistry<ScriptedExecutor> {
        SqlLockRegistry::new(ScriptedExecutor::new(), LockTable::new("test_catalog"))
    }

    #[test]
    fn table_follows_the_registry_convention() {
        assert_eq!(
            LockTable::new("cdl_tp_dev").name().to_string(),
            "cdl_tp_dev.internal_tp.tp_run_lock_plc"
        );
    }

    #[tokio::test]
    async fn inserts_all_records_in_one_statement() {
        let registry = registry();
        let created_at = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();

        registry
            .insert_locks(vec![
                LockRecord::queued(RunId::new(7), "x", created_at),
                LockRecord::queued(RunId::new(7), "it's", created_at),
            ])
            .await
            .unwrap();

        assert_eq!(
            registry.executor().statements(),
            vec![
                "INSERT INTO test_catalog.internal_tp.tp_run_lock_plc (run_id, lock_path, lock_sttus, creat_date) \
                 VALUES (7, 'x', false, '2026-10-16 08:30:00.000000+00:00'), \
                 (7, 'it''s', false, '2026-10-16 08:30:00.000000+00:00')"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn empty_insert_issues_no_sql() {
        let registry = registry();

        registry.insert_locks(vec![]).await.unwrap();

        assert!(registry.executor().statements().is_empty());
    }

    #[tokio::test]
    async fn counts_rows_held_by_other_runs() {
        let registry = SqlLockRegistry::new(
            ScriptedExecutor::with_counts([3]),
            LockTable::new("test_catalog"),
        );

        let count = registry
            .count_conflicting(RunId::new(101), &CheckPath::from_paths(["/tmp/lock1"]))
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            registry.executor().statements(),
            vec![
                "SELECT COUNT(*) FROM test_catalog.internal_tp.tp_run_lock_plc \
                 WHERE run_id <> 101 AND lock_path IN ('/tmp/lock1')"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn negative_counts_are_rejected() {
        let registry = SqlLockRegistry::new(
            ScriptedExecutor::with_counts([-1]),
            LockTable::new("test_catalog"),
        );

        let err = registry
            .count_conflicting(RunId::new(1), &CheckPath::from_paths(["/a"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ConversionError);
    }

    #[tokio::test]
    async fn empty_check_path_never_reaches_the_executor() {
        let registry = registry();

        let count = registry
            .count_conflicting(RunId::new(1), &CheckPath::empty())
            .await
            .unwrap();
        let deleted = registry
            .delete_locks(RunId::new(1), &CheckPath::empty())
            .await
            .unwrap();

        assert_eq!((count, deleted), (0, 0));
        assert!(registry.executor().statements().is_empty());
    }

    #[test]
    fn configured_schema_keeps_the_migrated_table_name() {
        let config = SemaphoreConfig {
            catalog: "cdl_tp_dev".to_string(),
            schema: "locks".to_string(),
            poll: Default::default(),
        };
        let table = LockTable::from_config(&config);

        assert_eq!(table.name().name, "tp_run_lock_plc");
        assert_eq!(
            table.delete_statement(RunId::new(5), &CheckPath::from_paths(["/p"])),
            "DELETE FROM cdl_tp_dev.locks.tp_run_lock_plc WHERE run_id = 5 AND lock_path IN ('/p')"
        );
    }
}
