use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ErrorKind, LockResult};
use crate::lock_error;
use crate::registry::SqlExecutor;

#[derive(Debug, Default)]
struct Inner {
    statements: Vec<String>,
    counts: VecDeque<i64>,
    failures: VecDeque<ErrorKind>,
}

/// Records executed SQL and answers count queries from a script.
///
/// Once the scripted counts run out every count query returns `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(counts: impl IntoIterator<Item = i64>) -> Self {
        let executor = Self::new();
        executor.lock().counts.extend(counts);
        executor
    }

    /// Makes the next call fail with an error of `kind`. Failures queue up in order.
    pub fn fail_next(&self, kind: ErrorKind) {
        self.lock().failures.push_back(kind);
    }

    /// Returns every statement received so far, failed ones included.
    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    /// Returns the number of `COUNT(*)` queries received so far.
    pub fn count_queries(&self) -> usize {
        self.lock()
            .statements
            .iter()
            .filter(|statement| statement.starts_with("SELECT COUNT(*)"))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, statement: String) -> LockResult<()> {
        let mut inner = self.lock();
        inner.statements.push(statement.clone());

        match inner.failures.pop_front() {
            Some(kind) => Err(lock_error!(kind, "Scripted executor failure", statement)),
            None => Ok(()),
        }
    }
}

impl SqlExecutor for ScriptedExecutor {
    async fn execute(&self, statement: String) -> LockResult<u64> {
        self.record(statement)?;

        Ok(0)
    }

    async fn query_count(&self, query: String) -> LockResult<i64> {
        self.record(query)?;

        Ok(self.lock().counts.pop_front().unwrap_or(0))
    }
}
