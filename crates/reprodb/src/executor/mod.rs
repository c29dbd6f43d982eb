//! Query executor trait for the schema maintenance engine.
//!
//! The [`QueryExecutor`] trait defines the interface the engine uses to talk
//! to the store. Implementations:
//!
//! - **PostgreSQL**: [`PgExecutor`] in `postgres.rs`
//! - **In-memory**: [`MemoryExecutor`] in `memory.rs`
//!
//! The engine works with `Arc<dyn QueryExecutor>` without knowing the
//! concrete type, so the migration logic can be exercised without a live
//! database.

mod memory;
mod postgres;

pub use memory::MemoryExecutor;
pub use postgres::PgExecutor;

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::Result;

/// A single value in a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
    Null,
}

impl SqlValue {
    /// The value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Outcome of executing a single statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Ordered row tuples, for reads.
    Rows(Vec<Vec<SqlValue>>),
    /// Affected row count, for updates and deletes.
    Count(u64),
    /// No meaningful result (DDL, inserts).
    Done,
}

impl QueryOutcome {
    /// First value of the first row, if any rows came back.
    pub fn first_value(&self) -> Option<&SqlValue> {
        match self {
            QueryOutcome::Rows(rows) => rows.first().and_then(|row| row.first()),
            _ => None,
        }
    }

    /// Number of rows returned, or 0 for non-row outcomes.
    pub fn row_count(&self) -> usize {
        match self {
            QueryOutcome::Rows(rows) => rows.len(),
            _ => 0,
        }
    }
}

/// Trait for running statements against the tracking database.
///
/// Implementations must be `Send + Sync` so the engine can hold them behind
/// an `Arc`. Transactions are an explicit scope: [`begin`](Self::begin),
/// then any number of [`execute`](Self::execute) calls, then
/// [`commit`](Self::commit) or [`rollback`](Self::rollback). Statements
/// executed outside that scope take effect immediately.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a single statement and return its outcome.
    async fn execute(&self, statement: &str) -> Result<QueryOutcome>;

    /// Reflect the set of tables currently present in the store.
    async fn table_names(&self) -> Result<BTreeSet<String>>;

    /// Open a transaction scope.
    async fn begin(&self) -> Result<()>;

    /// Commit the open transaction scope.
    async fn commit(&self) -> Result<()>;

    /// Roll back the open transaction scope.
    async fn rollback(&self) -> Result<()>;

    /// The executor type name for logging/debugging.
    fn executor_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_on_rows() {
        let outcome = QueryOutcome::Rows(vec![vec![SqlValue::Integer(42), SqlValue::Null]]);
        assert_eq!(outcome.first_value(), Some(&SqlValue::Integer(42)));
    }

    #[test]
    fn first_value_on_empty_rows() {
        let outcome = QueryOutcome::Rows(vec![]);
        assert_eq!(outcome.first_value(), None);
        assert_eq!(outcome.row_count(), 0);
    }

    #[test]
    fn first_value_on_count_and_done() {
        assert_eq!(QueryOutcome::Count(3).first_value(), None);
        assert_eq!(QueryOutcome::Done.first_value(), None);
    }

    #[test]
    fn sql_value_accessors() {
        assert_eq!(SqlValue::Integer(7).as_integer(), Some(7));
        assert_eq!(SqlValue::Text("x".into()).as_integer(), None);
        assert_eq!(SqlValue::Text("x".into()).as_text(), Some("x"));
        assert_eq!(SqlValue::Null.as_text(), None);
    }
}
