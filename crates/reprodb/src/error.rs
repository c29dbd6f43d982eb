//! Error types for the schema maintenance library.

use thiserror::Error;

/// Main error type for schema maintenance operations.
#[derive(Error, Debug)]
pub enum MaintainError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query error
    #[error("Database error: {0}")]
    Db(#[from] tokio_postgres::Error),

    /// Query executor error that is not tied to a driver error type
    #[error("Executor error: {0}")]
    Executor(String),

    /// The static schema definition is malformed (non-contiguous versions)
    #[error("Schema definition error: {0}")]
    Schema(String),

    /// The ledger records a version newer than the latest known update.
    /// The running code is older than the database; never auto-resolved.
    #[error(
        "the active database schema (version {db}) is higher than the last \
         update available ({latest}); please check!"
    )]
    VersionConflict { db: u32, latest: u32 },

    /// A statement of an update batch failed; the whole batch was rolled back.
    #[error("schema update #{version} failed on statement `{statement}`: {message}")]
    Batch {
        version: u32,
        statement: String,
        message: String,
    },

    /// IO error (config file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MaintainError {
    /// Create a Batch error from the failing version, statement and cause.
    pub fn batch(version: u32, statement: impl Into<String>, cause: &MaintainError) -> Self {
        MaintainError::Batch {
            version,
            statement: statement.into(),
            message: cause.to_string(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MaintainError::Config(_)
            | MaintainError::Yaml(_)
            | MaintainError::Io(_)
            | MaintainError::Schema(_) => 2,
            MaintainError::VersionConflict { .. } => 3,
            MaintainError::Batch { .. } => 4,
            _ => 1,
        }
    }
}

/// Result type alias for schema maintenance operations.
pub type Result<T> = std::result::Result<T, MaintainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_conflict_message_names_both_versions() {
        let err = MaintainError::VersionConflict { db: 50, latest: 49 };
        let msg = err.to_string();
        assert!(msg.contains("50"));
        assert!(msg.contains("49"));
    }

    #[test]
    fn batch_error_surfaces_version_and_statement() {
        let cause = MaintainError::Executor("syntax error".into());
        let err = MaintainError::batch(7, "ALTER TABLE results ADD COLUMN x", &cause);
        let msg = err.to_string();
        assert!(msg.contains("#7"));
        assert!(msg.contains("ALTER TABLE results"));
        assert!(msg.contains("syntax error"));
    }

    #[test]
    fn exit_codes_follow_error_taxonomy() {
        assert_eq!(MaintainError::Config("x".into()).exit_code(), 2);
        assert_eq!(
            MaintainError::VersionConflict { db: 2, latest: 1 }.exit_code(),
            3
        );
        let cause = MaintainError::Executor("boom".into());
        assert_eq!(MaintainError::batch(1, "SELECT 1", &cause).exit_code(), 4);
        assert_eq!(MaintainError::Executor("boom".into()).exit_code(), 1);
    }
}
