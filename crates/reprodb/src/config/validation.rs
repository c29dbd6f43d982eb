//! Configuration validation.

use super::Config;
use crate::error::{MaintainError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.database.host.is_empty() {
        return Err(MaintainError::Config("database.host is required".into()));
    }
    if config.database.database.is_empty() {
        return Err(MaintainError::Config(
            "database.database is required".into(),
        ));
    }
    if config.database.user.is_empty() {
        return Err(MaintainError::Config("database.user is required".into()));
    }
    if config.database.port == 0 {
        return Err(MaintainError::Config(
            "database.port must be non-zero".into(),
        ));
    }

    Ok(())
}
