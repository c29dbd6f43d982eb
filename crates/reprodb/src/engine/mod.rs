//! Schema maintenance engine - bootstrap and versioned migration driver.
//!
//! The engine brings the tracking database from whatever state it is in to
//! the latest known schema: it creates the base tables when no ledger
//! exists, then applies every pending update batch in ascending version
//! order, one transaction per batch, recording each applied version in the
//! ledger as part of the same transaction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{MaintainError, Result};
use crate::executor::{QueryExecutor, SqlValue};
use crate::schema::SchemaDef;

/// Schema maintenance engine.
///
/// Owns no global state: the query executor and the schema definition are
/// both injected at construction. The engine assumes exclusive write access
/// to the schema for the duration of a run; concurrent invocations are
/// excluded operationally (a single cron slot), and the store's transaction
/// guarantees make a racing second run either a clean no-op or a clean
/// failure.
pub struct SchemaEngine {
    executor: Arc<dyn QueryExecutor>,
    schema: SchemaDef,
}

/// Result of a maintenance run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceResult {
    /// Whether the base tables were (re)created.
    pub bootstrapped: bool,

    /// Ledger version before the run.
    pub from_version: u32,

    /// Ledger version after the run.
    pub to_version: u32,

    /// Number of update batches applied.
    pub batches_applied: u32,

    /// Total duration in seconds.
    pub duration_seconds: f64,
}

impl MaintenanceResult {
    /// Serialize to pretty JSON for `--output-json`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True if the run changed nothing.
    pub fn is_noop(&self) -> bool {
        !self.bootstrapped && self.batches_applied == 0
    }
}

impl SchemaEngine {
    /// Create a new engine for the given executor and schema definition.
    ///
    /// Fails if the schema definition's update versions are not contiguous.
    pub fn new(executor: Arc<dyn QueryExecutor>, schema: SchemaDef) -> Result<Self> {
        schema.validate()?;
        debug!(
            "schema engine ready: executor={}, latest known version={}",
            executor.executor_type(),
            schema.latest_version()
        );
        Ok(Self { executor, schema })
    }

    /// Bootstrap the base tables if the database has no version ledger yet.
    ///
    /// Returns `true` if anything was created. A database whose ledger
    /// exists and holds at least one row is left completely untouched.
    /// Bootstrap establishes version 1 implicitly: the base schema *is*
    /// version 1, so a fresh ledger gets its first row here, outside any
    /// version-tracked transaction.
    pub async fn ensure_bootstrap(&self) -> Result<bool> {
        let tables = self.executor.table_names().await?;

        if tables.contains(&self.schema.ledger_table) {
            let rows = self
                .executor
                .execute(&format!(
                    "SELECT version FROM {}",
                    self.schema.ledger_table
                ))
                .await?;
            if rows.row_count() > 0 {
                debug!("ledger table is populated, no bootstrap needed");
                return Ok(false);
            }
            warn!(
                "the {} table exists but is empty; re-running table creation",
                self.schema.ledger_table
            );
        } else {
            warn!(
                "there is no {} table in the database; running a full table creation",
                self.schema.ledger_table
            );
        }

        for table in &self.schema.initial {
            if tables.contains(&table.name) {
                continue;
            }
            warn!("{} does not exist. Creating...", table.name);
            for statement in &table.statements {
                info!("\t{}", compact(statement));
                self.executor.execute(statement).await?;
            }
        }

        self.record_version(1).await?;
        info!("database bootstrapped at schema version 1");
        Ok(true)
    }

    /// The highest version recorded in the ledger, or 0 if the ledger is
    /// absent or empty.
    pub async fn current_version(&self) -> Result<u32> {
        let tables = self.executor.table_names().await?;
        if !tables.contains(&self.schema.ledger_table) {
            return Ok(0);
        }

        let outcome = self
            .executor
            .execute(&format!(
                "SELECT MAX(version) FROM {}",
                self.schema.ledger_table
            ))
            .await?;

        match outcome.first_value() {
            Some(SqlValue::Integer(version)) if *version > 0 => Ok(*version as u32),
            _ => Ok(0),
        }
    }

    /// Apply every update batch between the current and the latest version.
    ///
    /// Each batch runs in its own transaction together with its ledger
    /// insert, so a batch either commits completely or not at all. Any
    /// failure rolls the open transaction back and aborts the run; the
    /// ledger stays at the last committed version and a re-run resumes
    /// from there.
    ///
    /// Returns `true` if at least one batch was applied.
    pub async fn apply_pending(&self) -> Result<bool> {
        let current = self.current_version().await?;
        let latest = self.schema.latest_version();

        if current == latest {
            info!("no pending schema updates, database is at version {}", current);
            return Ok(false);
        }
        if current > latest {
            return Err(MaintainError::VersionConflict {
                db: current,
                latest,
            });
        }

        info!(
            "found schema updates: database at version {}, latest known is {}",
            current, latest
        );

        for version in (current + 1)..=latest {
            // validate() guarantees the key exists
            let batch = &self.schema.updates[&version];
            info!(
                "applying database update #{} ({} queries)",
                version,
                batch.len()
            );
            let started = Instant::now();

            self.executor.begin().await?;
            match self.apply_batch(version, batch).await {
                Ok(()) => {
                    self.executor.commit().await?;
                    info!(
                        "update #{}: {} queries executed in {:.3}s",
                        version,
                        batch.len(),
                        started.elapsed().as_secs_f64()
                    );
                }
                Err(e) => {
                    // Best effort; the failure to surface is the batch error.
                    if let Err(rollback_err) = self.executor.rollback().await {
                        warn!("rollback after failed update also failed: {}", rollback_err);
                    }
                    return Err(e);
                }
            }
        }

        Ok(true)
    }

    /// Bootstrap if needed, then apply pending updates.
    pub async fn run(&self) -> Result<MaintenanceResult> {
        let started = Instant::now();
        let from_version = self.current_version().await?;

        let bootstrapped = self.ensure_bootstrap().await?;
        self.apply_pending().await?;

        let to_version = self.current_version().await?;
        let result = MaintenanceResult {
            bootstrapped,
            from_version,
            to_version,
            batches_applied: to_version - from_version.max(u32::from(bootstrapped)),
            duration_seconds: started.elapsed().as_secs_f64(),
        };

        if result.is_noop() {
            info!("no pending updates");
        } else {
            info!(
                "maintenance finished in {:.3}s: version {} -> {}",
                result.duration_seconds, result.from_version, result.to_version
            );
        }
        Ok(result)
    }

    /// The latest version this build of the engine knows about.
    pub fn latest_version(&self) -> u32 {
        self.schema.latest_version()
    }

    async fn apply_batch(&self, version: u32, batch: &[String]) -> Result<()> {
        for statement in batch {
            debug!("\t{}", compact(statement));
            self.executor
                .execute(statement)
                .await
                .map_err(|e| MaintainError::batch(version, compact(statement), &e))?;
        }
        self.record_version(version).await.map_err(|e| {
            MaintainError::batch(version, format!("<record version {}>", version), &e)
        })?;
        Ok(())
    }

    async fn record_version(&self, version: u32) -> Result<()> {
        // Nanosecond precision so consecutive batches get distinct,
        // lexicographically ordered dates.
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.9f");
        self.executor
            .execute(&format!(
                "INSERT INTO {} (version, date) VALUES ({}, '{}')",
                self.schema.ledger_table, version, stamp
            ))
            .await?;
        Ok(())
    }
}

/// Collapse a multi-line SQL literal to a single log-friendly line.
fn compact(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MemoryExecutor;
    use crate::schema::TableDef;
    use std::collections::BTreeMap;

    fn small_schema(latest: u32) -> SchemaDef {
        let mut updates = BTreeMap::new();
        updates.insert(1, vec![]);
        for version in 2..=latest {
            updates.insert(
                version,
                vec![
                    format!("ALTER TABLE packages ADD COLUMN col_{} TEXT", version),
                    format!("INSERT INTO packages (name) VALUES ('seed-{}')", version),
                ],
            );
        }
        SchemaDef {
            ledger_table: "rb_schema".to_string(),
            initial: vec![
                TableDef::new(
                    "rb_schema",
                    vec![
                        "CREATE TABLE rb_schema (version INTEGER NOT NULL, date TEXT NOT NULL, PRIMARY KEY (version))"
                            .to_string(),
                    ],
                ),
                TableDef::new(
                    "packages",
                    vec!["CREATE TABLE packages (name TEXT NOT NULL)".to_string()],
                ),
            ],
            updates,
        }
    }

    fn engine_with(latest: u32) -> (Arc<MemoryExecutor>, SchemaEngine) {
        let executor = Arc::new(MemoryExecutor::new());
        let engine = SchemaEngine::new(executor.clone(), small_schema(latest)).unwrap();
        (executor, engine)
    }

    #[tokio::test]
    async fn bootstrap_creates_tables_and_version_one() {
        let (executor, engine) = engine_with(1);

        assert!(engine.ensure_bootstrap().await.unwrap());
        assert!(executor.tables().contains("rb_schema"));
        assert!(executor.tables().contains("packages"));
        assert_eq!(executor.ledger(), vec![(1, executor.ledger()[0].1.clone())]);
        assert_eq!(engine.current_version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn bootstrap_on_populated_ledger_is_a_noop() {
        let (executor, engine) = engine_with(1);
        engine.ensure_bootstrap().await.unwrap();

        let writes_before = executor.write_statements().len();
        assert!(!engine.ensure_bootstrap().await.unwrap());
        assert_eq!(executor.write_statements().len(), writes_before);
    }

    #[tokio::test]
    async fn bootstrap_skips_existing_tables() {
        // `packages` already exists; only the ledger is missing.
        let executor = Arc::new(MemoryExecutor::with_tables(["packages"]));
        let engine = SchemaEngine::new(executor.clone(), small_schema(1)).unwrap();

        assert!(engine.ensure_bootstrap().await.unwrap());
        assert!(!executor
            .executed()
            .iter()
            .any(|s| s.contains("CREATE TABLE packages")));
        assert_eq!(engine.current_version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn current_version_is_zero_without_ledger() {
        let (_, engine) = engine_with(3);
        assert_eq!(engine.current_version().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn apply_pending_walks_every_version_in_order() {
        let (executor, engine) = engine_with(4);
        engine.ensure_bootstrap().await.unwrap();

        assert!(engine.apply_pending().await.unwrap());
        assert_eq!(engine.current_version().await.unwrap(), 4);

        let versions: Vec<i64> = executor.ledger().iter().map(|(v, _)| *v).collect();
        assert_eq!(versions, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn ledger_is_contiguous_prefix_after_any_run() {
        let (executor, engine) = engine_with(6);
        engine.run().await.unwrap();

        let versions: Vec<i64> = executor.ledger().iter().map(|(v, _)| *v).collect();
        let expected: Vec<i64> = (1..=engine.current_version().await.unwrap() as i64).collect();
        assert_eq!(versions, expected);
    }

    #[tokio::test]
    async fn apply_pending_twice_is_idempotent() {
        let (executor, engine) = engine_with(3);
        engine.ensure_bootstrap().await.unwrap();
        assert!(engine.apply_pending().await.unwrap());

        let writes_before = executor.write_statements().len();
        assert!(!engine.apply_pending().await.unwrap());
        assert_eq!(
            executor.write_statements().len(),
            writes_before,
            "second apply_pending must perform zero writes"
        );
    }

    #[tokio::test]
    async fn failing_statement_rolls_back_whole_batch() {
        let (executor, engine) = engine_with(3);
        engine.ensure_bootstrap().await.unwrap();

        // Fail the *second* statement of batch 3: batch 2 must commit,
        // batch 3 must leave nothing behind.
        executor.fail_when_contains("VALUES ('seed-3')");
        let err = engine.apply_pending().await.unwrap_err();
        match err {
            MaintainError::Batch { version, ref statement, .. } => {
                assert_eq!(version, 3);
                assert!(statement.contains("seed-3"));
            }
            other => panic!("expected Batch error, got {:?}", other),
        }

        assert_eq!(engine.current_version().await.unwrap(), 2);
        let versions: Vec<i64> = executor.ledger().iter().map(|(v, _)| *v).collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[tokio::test]
    async fn rerun_resumes_after_failure_without_duplicates() {
        let (executor, engine) = engine_with(4);
        engine.ensure_bootstrap().await.unwrap();

        executor.fail_when_contains("VALUES ('seed-4')");
        assert!(engine.apply_pending().await.is_err());
        assert_eq!(engine.current_version().await.unwrap(), 3);

        executor.clear_failure();
        assert!(engine.apply_pending().await.unwrap());
        assert_eq!(engine.current_version().await.unwrap(), 4);

        // Batches 2 and 3 were applied exactly once.
        let seed_2 = executor
            .executed()
            .iter()
            .filter(|s| s.contains("VALUES ('seed-2')"))
            .count();
        assert_eq!(seed_2, 1);
        let versions: Vec<i64> = executor.ledger().iter().map(|(v, _)| *v).collect();
        assert_eq!(versions, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn version_ahead_of_code_aborts_before_any_statement() {
        let (executor, engine) = engine_with(2);
        engine.run().await.unwrap();

        // Same store, older code: only knows about version 1.
        let old_engine = SchemaEngine::new(executor.clone(), small_schema(1)).unwrap();
        let writes_before = executor.write_statements().len();
        let err = old_engine.apply_pending().await.unwrap_err();
        assert!(matches!(
            err,
            MaintainError::VersionConflict { db: 2, latest: 1 }
        ));
        assert_eq!(executor.write_statements().len(), writes_before);
    }

    #[tokio::test]
    async fn end_to_end_bootstrap_and_three_updates() {
        let (executor, engine) = engine_with(4);

        assert!(engine.ensure_bootstrap().await.unwrap());
        assert_eq!(engine.current_version().await.unwrap(), 1);

        assert!(engine.apply_pending().await.unwrap());
        assert_eq!(engine.current_version().await.unwrap(), 4);

        let ledger = executor.ledger();
        assert_eq!(ledger.len(), 4);
        for window in ledger.windows(2) {
            assert!(
                window[0].1 < window[1].1,
                "ledger dates must be strictly increasing: {:?}",
                ledger
            );
        }
    }

    #[tokio::test]
    async fn run_reports_versions_and_noop() {
        let (_, engine) = engine_with(3);

        let first = engine.run().await.unwrap();
        assert!(first.bootstrapped);
        assert_eq!(first.from_version, 0);
        assert_eq!(first.to_version, 3);
        assert_eq!(first.batches_applied, 2);
        assert!(!first.is_noop());

        let second = engine.run().await.unwrap();
        assert!(!second.bootstrapped);
        assert_eq!(second.from_version, 3);
        assert_eq!(second.to_version, 3);
        assert_eq!(second.batches_applied, 0);
        assert!(second.is_noop());
    }

    #[tokio::test]
    async fn rejects_gapped_schema_at_construction() {
        let mut schema = small_schema(3);
        schema.updates.remove(&2);
        let result = SchemaEngine::new(Arc::new(MemoryExecutor::new()), schema);
        assert!(matches!(result, Err(MaintainError::Schema(_))));
    }

    #[tokio::test]
    async fn full_reproducible_schema_applies_in_memory() {
        // Sanity check the real schema end to end against the in-memory
        // store: every batch applies and the ledger reaches version 49.
        let executor = Arc::new(MemoryExecutor::new());
        let engine =
            SchemaEngine::new(executor.clone(), SchemaDef::reproducible()).unwrap();

        let result = engine.run().await.unwrap();
        assert!(result.bootstrapped);
        assert_eq!(result.to_version, 49);
        assert_eq!(engine.current_version().await.unwrap(), 49);

        // The tmp-table dances must all have resolved.
        assert!(executor.tables().iter().all(|t| !t.ends_with("_tmp")));
        assert!(executor.tables().contains("sources"));
        assert!(executor.tables().contains("distributions"));
        assert!(!executor.tables().contains("source_packages"));
    }
}
