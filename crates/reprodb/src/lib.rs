//! # reprodb
//!
//! Schema maintenance library for the reproducible-builds tracking database.
//!
//! This library tracks the database schema and the changes made to it over
//! time, and allows simple creation and migration of it:
//!
//! - **Bootstrap** of the base tables on a virgin database
//! - **Versioned schema updates** applied exactly once each, in order,
//!   one transaction per update batch
//! - **Ledger tracking** via the `rb_schema` table (version, date)
//! - **Pluggable query executor** so the engine can run against PostgreSQL
//!   or an in-memory stand-in
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reprodb::{Config, PgExecutor, SchemaDef, SchemaEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reprodb::MaintainError> {
//!     let config = Config::load("reprodb.yaml")?;
//!     let executor = PgExecutor::connect(&config.database).await?;
//!     let engine = SchemaEngine::new(Arc::new(executor), SchemaDef::reproducible())?;
//!     let result = engine.run().await?;
//!     println!("database now at schema version {}", result.to_version);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod schema;

// Re-exports for convenient access
pub use config::{Config, DbConfig};
pub use engine::{MaintenanceResult, SchemaEngine};
pub use error::{MaintainError, Result};
pub use executor::{MemoryExecutor, PgExecutor, QueryExecutor, QueryOutcome, SqlValue};
pub use schema::{SchemaDef, TableDef};
