//! PostgreSQL query executor.
//!
//! Uses the simple-query protocol: the migration batches are literal SQL
//! with no parameters, and simple queries avoid preparing statements that
//! are each executed exactly once. Transactions are driven with literal
//! BEGIN/COMMIT/ROLLBACK on the single connection this executor holds.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio_postgres::{NoTls, SimpleQueryMessage};
use tracing::{debug, error};

use super::{QueryExecutor, QueryOutcome, SqlValue};
use crate::config::DbConfig;
use crate::error::Result;

/// Query executor backed by a single PostgreSQL connection.
pub struct PgExecutor {
    client: tokio_postgres::Client,
}

impl PgExecutor {
    /// Connect to the tracking database.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let (client, connection) =
            tokio_postgres::connect(&config.connection_string(), NoTls).await?;

        // The connection object performs the actual I/O and must be polled
        // for the client to make progress.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("database connection error: {}", e);
            }
        });

        debug!(
            "connected to postgres database {} on {}:{}",
            config.database, config.host, config.port
        );

        Ok(Self { client })
    }

    fn outcome_from_messages(
        statement: &str,
        messages: Vec<SimpleQueryMessage>,
    ) -> QueryOutcome {
        let mut rows = Vec::new();
        let mut count = 0u64;
        for message in messages {
            match message {
                SimpleQueryMessage::Row(row) => {
                    let values = (0..row.len())
                        .map(|i| match row.get(i) {
                            Some(text) => match text.parse::<i64>() {
                                Ok(n) => SqlValue::Integer(n),
                                Err(_) => SqlValue::Text(text.to_string()),
                            },
                            None => SqlValue::Null,
                        })
                        .collect();
                    rows.push(values);
                }
                SimpleQueryMessage::CommandComplete(n) => count = n,
                _ => {}
            }
        }

        if !rows.is_empty() {
            return QueryOutcome::Rows(rows);
        }

        let keyword = statement
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" => QueryOutcome::Rows(rows),
            "INSERT" | "UPDATE" | "DELETE" => QueryOutcome::Count(count),
            _ => QueryOutcome::Done,
        }
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn execute(&self, statement: &str) -> Result<QueryOutcome> {
        let messages = self.client.simple_query(statement).await?;
        Ok(Self::outcome_from_messages(statement, messages))
    }

    async fn table_names(&self) -> Result<BTreeSet<String>> {
        let messages = self
            .client
            .simple_query(
                "SELECT tablename FROM pg_catalog.pg_tables \
                 WHERE schemaname = current_schema()",
            )
            .await?;

        let mut names = BTreeSet::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                if let Some(name) = row.get(0) {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    async fn begin(&self) -> Result<()> {
        self.client.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }

    fn executor_type(&self) -> &'static str {
        "postgres"
    }
}
