//! In-memory query executor.
//!
//! Models only what the maintenance engine observes through the
//! [`QueryExecutor`] trait: the set of existing tables, the contents of the
//! version ledger, and transaction scoping (snapshot on begin, restore on
//! rollback). Every other statement is accepted and recorded without being
//! interpreted.
//!
//! A failure can be injected by substring match to exercise the rollback
//! path without a live database.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Mutex;

use super::{QueryExecutor, QueryOutcome, SqlValue};
use crate::error::{MaintainError, Result};

/// In-memory stand-in for the tracking database.
pub struct MemoryExecutor {
    inner: Mutex<Inner>,
    ledger_table: String,
}

struct Inner {
    tables: BTreeSet<String>,
    ledger: Vec<(i64, String)>,
    snapshot: Option<(BTreeSet<String>, Vec<(i64, String)>)>,
    executed: Vec<String>,
    fail_on: Option<String>,
}

impl MemoryExecutor {
    /// Create an empty store with the default `rb_schema` ledger table name.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tables: BTreeSet::new(),
                ledger: Vec::new(),
                snapshot: None,
                executed: Vec::new(),
                fail_on: None,
            }),
            ledger_table: "rb_schema".to_string(),
        }
    }

    /// Create a store pre-seeded with the given tables.
    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let executor = Self::new();
        {
            let mut inner = executor.inner.lock().unwrap();
            inner.tables = tables.into_iter().map(Into::into).collect();
        }
        executor
    }

    /// Fail any statement containing `pattern` until the failure is cleared.
    pub fn fail_when_contains(&self, pattern: impl Into<String>) {
        self.inner.lock().unwrap().fail_on = Some(pattern.into());
    }

    /// Clear a previously injected failure.
    pub fn clear_failure(&self) {
        self.inner.lock().unwrap().fail_on = None;
    }

    /// Every statement executed so far, in order, including rolled-back ones.
    pub fn executed(&self) -> Vec<String> {
        self.inner.lock().unwrap().executed.clone()
    }

    /// Executed statements that are not plain reads.
    pub fn write_statements(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|s| !s.trim_start().to_ascii_uppercase().starts_with("SELECT"))
            .collect()
    }

    /// Committed ledger rows as (version, date) pairs, in insertion order.
    pub fn ledger(&self) -> Vec<(i64, String)> {
        self.inner.lock().unwrap().ledger.clone()
    }

    /// The committed table set.
    pub fn tables(&self) -> BTreeSet<String> {
        self.inner.lock().unwrap().tables.clone()
    }

    fn apply(&self, inner: &mut Inner, statement: &str) -> Result<QueryOutcome> {
        let normalized = normalize(statement);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let keyword = tokens.first().map(|t| t.to_ascii_uppercase());

        match keyword.as_deref() {
            Some("CREATE") if matches_kw(&tokens, 1, "TABLE") => {
                let name = ident(tokens.get(2));
                if inner.tables.contains(&name) {
                    return Err(MaintainError::Executor(format!(
                        "table {} already exists",
                        name
                    )));
                }
                inner.tables.insert(name);
                Ok(QueryOutcome::Done)
            }
            Some("DROP") if matches_kw(&tokens, 1, "TABLE") => {
                let name = ident(tokens.get(2));
                if !inner.tables.remove(&name) {
                    return Err(MaintainError::Executor(format!(
                        "table {} does not exist",
                        name
                    )));
                }
                Ok(QueryOutcome::Done)
            }
            Some("ALTER")
                if matches_kw(&tokens, 1, "TABLE")
                    && matches_kw(&tokens, 3, "RENAME")
                    && matches_kw(&tokens, 4, "TO") =>
            {
                let old = ident(tokens.get(2));
                let new = ident(tokens.get(5));
                if !inner.tables.remove(&old) {
                    return Err(MaintainError::Executor(format!(
                        "table {} does not exist",
                        old
                    )));
                }
                inner.tables.insert(new);
                Ok(QueryOutcome::Done)
            }
            Some("INSERT") if ident(tokens.get(2)) == self.ledger_table => {
                let (version, date) = parse_ledger_values(&normalized)?;
                if inner.ledger.iter().any(|(v, _)| *v == version) {
                    return Err(MaintainError::Executor(format!(
                        "duplicate key value violates unique constraint on {}: version {}",
                        self.ledger_table, version
                    )));
                }
                inner.ledger.push((version, date));
                Ok(QueryOutcome::Count(1))
            }
            Some("SELECT") => {
                let upper = normalized.to_ascii_uppercase();
                let ledger_upper = self.ledger_table.to_ascii_uppercase();
                if upper.starts_with(&format!("SELECT MAX(VERSION) FROM {}", ledger_upper)) {
                    let max = inner.ledger.iter().map(|(v, _)| *v).max();
                    let value = match max {
                        Some(v) => SqlValue::Integer(v),
                        None => SqlValue::Null,
                    };
                    return Ok(QueryOutcome::Rows(vec![vec![value]]));
                }
                if upper.contains(&format!("FROM {}", ledger_upper)) {
                    let rows = inner
                        .ledger
                        .iter()
                        .map(|(v, d)| vec![SqlValue::Integer(*v), SqlValue::Text(d.clone())])
                        .collect();
                    return Ok(QueryOutcome::Rows(rows));
                }
                Ok(QueryOutcome::Rows(Vec::new()))
            }
            Some("UPDATE") | Some("DELETE") => Ok(QueryOutcome::Count(0)),
            Some("INSERT") => Ok(QueryOutcome::Count(0)),
            // CREATE VIEW, CREATE SEQUENCE, CREATE TYPE, other ALTERs, ...
            _ => Ok(QueryOutcome::Done),
        }
    }
}

impl Default for MemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn execute(&self, statement: &str) -> Result<QueryOutcome> {
        let mut inner = self.inner.lock().unwrap();
        inner.executed.push(statement.to_string());

        if let Some(pattern) = inner.fail_on.clone() {
            if statement.contains(&pattern) {
                return Err(MaintainError::Executor(format!(
                    "injected failure on statement containing `{}`",
                    pattern
                )));
            }
        }

        self.apply(&mut inner, statement)
    }

    async fn table_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.inner.lock().unwrap().tables.clone())
    }

    async fn begin(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.snapshot.is_some() {
            return Err(MaintainError::Executor(
                "transaction already in progress".into(),
            ));
        }
        inner.snapshot = Some((inner.tables.clone(), inner.ledger.clone()));
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.snapshot.take().is_none() {
            return Err(MaintainError::Executor("no transaction to commit".into()));
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        match inner.snapshot.take() {
            Some((tables, ledger)) => {
                inner.tables = tables;
                inner.ledger = ledger;
                Ok(())
            }
            None => Err(MaintainError::Executor(
                "no transaction to roll back".into(),
            )),
        }
    }

    fn executor_type(&self) -> &'static str {
        "memory"
    }
}

/// Collapse whitespace runs and strip a trailing semicolon.
fn normalize(statement: &str) -> String {
    let collapsed = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches(';').trim().to_string()
}

fn matches_kw(tokens: &[&str], index: usize, keyword: &str) -> bool {
    tokens
        .get(index)
        .map(|t| t.eq_ignore_ascii_case(keyword))
        .unwrap_or(false)
}

/// Extract a bare identifier from a token, stopping at any punctuation.
fn ident(token: Option<&&str>) -> String {
    token
        .map(|t| {
            t.chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect()
        })
        .unwrap_or_default()
}

/// Parse `(version, 'date')` out of an INSERT into the ledger table.
fn parse_ledger_values(normalized: &str) -> Result<(i64, String)> {
    let upper = normalized.to_ascii_uppercase();
    let values_at = upper.find("VALUES").ok_or_else(|| {
        MaintainError::Executor(format!("cannot parse ledger insert: {}", normalized))
    })?;
    let tail = normalized[values_at + "VALUES".len()..]
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')');
    let mut parts = tail.splitn(2, ',');
    let version = parts
        .next()
        .unwrap_or_default()
        .trim()
        .parse::<i64>()
        .map_err(|_| {
            MaintainError::Executor(format!("cannot parse ledger version: {}", normalized))
        })?;
    let date = parts
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('\'')
        .to_string();
    Ok((version, date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_create_drop_rename() {
        let executor = MemoryExecutor::new();
        executor
            .execute("CREATE TABLE sources (name TEXT NOT NULL)")
            .await
            .unwrap();
        executor
            .execute("CREATE TABLE sources_tmp (name TEXT NOT NULL)")
            .await
            .unwrap();
        executor.execute("DROP TABLE sources").await.unwrap();
        executor
            .execute("ALTER TABLE sources_tmp RENAME TO sources")
            .await
            .unwrap();

        let tables = executor.table_names().await.unwrap();
        assert!(tables.contains("sources"));
        assert!(!tables.contains("sources_tmp"));
    }

    #[tokio::test]
    async fn rejects_duplicate_create() {
        let executor = MemoryExecutor::new();
        executor.execute("CREATE TABLE notes (x TEXT)").await.unwrap();
        assert!(executor
            .execute("CREATE TABLE notes (x TEXT)")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn rename_column_does_not_rename_table() {
        let executor = MemoryExecutor::with_tables(["stats_pkg_state"]);
        executor
            .execute("ALTER TABLE stats_pkg_state RENAME COLUMN unreproducible to FTBR")
            .await
            .unwrap();
        assert!(executor.table_names().await.unwrap().contains("stats_pkg_state"));
    }

    #[tokio::test]
    async fn ledger_insert_and_max() {
        let executor = MemoryExecutor::new();
        executor
            .execute("CREATE TABLE rb_schema (version INTEGER, date TEXT)")
            .await
            .unwrap();
        executor
            .execute("INSERT INTO rb_schema (version, date) VALUES (1, '2026-08-30 10:00:00')")
            .await
            .unwrap();
        executor
            .execute("INSERT INTO rb_schema (version, date) VALUES (2, '2026-08-30 10:00:01')")
            .await
            .unwrap();

        let outcome = executor
            .execute("SELECT MAX(version) FROM rb_schema")
            .await
            .unwrap();
        assert_eq!(outcome.first_value(), Some(&SqlValue::Integer(2)));

        assert!(executor
            .execute("INSERT INTO rb_schema (version, date) VALUES (2, 'again')")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn max_version_on_empty_ledger_is_null() {
        let executor = MemoryExecutor::new();
        let outcome = executor
            .execute("SELECT MAX(version) FROM rb_schema")
            .await
            .unwrap();
        assert_eq!(outcome.first_value(), Some(&SqlValue::Null));
    }

    #[tokio::test]
    async fn rollback_restores_snapshot() {
        let executor = MemoryExecutor::with_tables(["sources"]);
        executor.begin().await.unwrap();
        executor.execute("CREATE TABLE issues (x TEXT)").await.unwrap();
        executor.execute("DROP TABLE sources").await.unwrap();
        executor.rollback().await.unwrap();

        let tables = executor.table_names().await.unwrap();
        assert!(tables.contains("sources"));
        assert!(!tables.contains("issues"));
    }

    #[tokio::test]
    async fn commit_keeps_changes() {
        let executor = MemoryExecutor::new();
        executor.begin().await.unwrap();
        executor.execute("CREATE TABLE issues (x TEXT)").await.unwrap();
        executor.commit().await.unwrap();
        assert!(executor.table_names().await.unwrap().contains("issues"));
    }

    #[tokio::test]
    async fn injected_failure_fires_and_clears() {
        let executor = MemoryExecutor::new();
        executor.fail_when_contains("ADD COLUMN notify");
        assert!(executor
            .execute("ALTER TABLE schedule ADD COLUMN notify TEXT")
            .await
            .is_err());
        executor.clear_failure();
        assert!(executor
            .execute("ALTER TABLE schedule ADD COLUMN notify TEXT")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn nested_begin_is_rejected() {
        let executor = MemoryExecutor::new();
        executor.begin().await.unwrap();
        assert!(executor.begin().await.is_err());
        executor.rollback().await.unwrap();
        assert!(executor.rollback().await.is_err());
    }
}
