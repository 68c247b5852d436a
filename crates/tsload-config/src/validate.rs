//! Semantic validation of a resolved configuration.

use crate::config::{LoadConfig, LoaderConfig, StoreConfig};

/// A configuration value that cannot drive a load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("store.url must not be empty")]
    EmptyUrl,

    #[error("store.url must start with http:// or https://, got {0:?}")]
    UnsupportedScheme(String),

    #[error("store.database must not be empty")]
    EmptyDatabase,

    #[error("load.batch_budget_bytes must be greater than zero")]
    ZeroBudget,

    #[error("load.tags_table must not be empty")]
    EmptyTagsTable,
}

impl LoaderConfig {
    /// Check the values a load depends on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.store.validate()?;
        self.load.validate()
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ValidationError::UnsupportedScheme(url.to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(ValidationError::EmptyDatabase);
        }
        Ok(())
    }
}

impl LoadConfig {
    /// Checks that do not involve the store, enough for parse-only commands.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_budget_bytes == 0 {
            return Err(ValidationError::ZeroBudget);
        }
        if self.tags_table.trim().is_empty() {
            return Err(ValidationError::EmptyTagsTable);
        }
        Ok(())
    }
}
