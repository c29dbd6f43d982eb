//! Static schema definition: base tables and versioned update batches.
//!
//! The schema itself is pure data. `initial` holds the table bundles used
//! to bootstrap a virgin database; `updates` holds the numbered batches
//! that migrate a live database forward one version at a time. The engine
//! receives the whole definition as a [`SchemaDef`] value, so tests can
//! substitute small synthetic schemas.

mod initial;
mod updates;

use std::collections::BTreeMap;

use crate::error::{MaintainError, Result};

/// One table of the base schema: name plus creation statements.
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: String,
    pub statements: Vec<String>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, statements: Vec<String>) -> Self {
        Self {
            name: name.into(),
            statements,
        }
    }
}

/// The complete schema definition handed to the engine.
#[derive(Debug, Clone)]
pub struct SchemaDef {
    /// Name of the version ledger table.
    pub ledger_table: String,

    /// Base tables created when bootstrapping a database with no ledger.
    pub initial: Vec<TableDef>,

    /// Update batches keyed by the version they migrate the schema *to*.
    pub updates: BTreeMap<u32, Vec<String>>,
}

impl SchemaDef {
    /// The built-in schema of the reproducible-builds tracking database.
    pub fn reproducible() -> Self {
        Self {
            ledger_table: "rb_schema".to_string(),
            initial: initial::tables(),
            updates: updates::batches(),
        }
    }

    /// The highest version any update batch migrates to.
    pub fn latest_version(&self) -> u32 {
        self.updates.keys().next_back().copied().unwrap_or(0)
    }

    /// Check that the update versions are exactly `1..=latest` with no gaps.
    ///
    /// A gap or a zero version is a programming error in the static batch
    /// table, caught here once instead of guarded against at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.ledger_table.is_empty() {
            return Err(MaintainError::Schema("ledger table name is empty".into()));
        }
        for (expected, version) in (1u32..).zip(self.updates.keys().copied()) {
            if version != expected {
                return Err(MaintainError::Schema(format!(
                    "update versions must be contiguous from 1: expected {}, found {}",
                    expected, version
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproducible_schema_is_valid() {
        let schema = SchemaDef::reproducible();
        schema.validate().unwrap();
        assert_eq!(schema.latest_version(), 49);
    }

    #[test]
    fn reproducible_base_tables() {
        let schema = SchemaDef::reproducible();
        assert_eq!(schema.initial.len(), 11);
        assert_eq!(schema.initial[0].name, "rb_schema");
        assert!(schema
            .initial
            .iter()
            .any(|table| table.name == "sources"));
        for table in &schema.initial {
            assert!(
                !table.statements.is_empty(),
                "table {} has no creation statements",
                table.name
            );
            assert!(table.statements[0].contains(&table.name));
        }
    }

    #[test]
    fn first_update_batch_is_empty() {
        // Version 1 is the base schema itself; its batch carries no statements.
        let schema = SchemaDef::reproducible();
        assert!(schema.updates[&1].is_empty());
    }

    #[test]
    fn detects_version_gap() {
        let mut schema = SchemaDef::reproducible();
        schema.updates.remove(&7);
        assert!(matches!(
            schema.validate(),
            Err(MaintainError::Schema(_))
        ));
    }

    #[test]
    fn detects_zero_version() {
        let mut schema = SchemaDef::reproducible();
        schema.updates.insert(0, vec![]);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn empty_updates_have_latest_zero() {
        let schema = SchemaDef {
            ledger_table: "rb_schema".into(),
            initial: vec![],
            updates: BTreeMap::new(),
        };
        assert_eq!(schema.latest_version(), 0);
        schema.validate().unwrap();
    }
}
