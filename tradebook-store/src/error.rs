//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity (trade)
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Backend failure (remote sync, disk, ...)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Domain error passthrough
    #[error("Domain error: {0}")]
    Domain(#[from] tradebook_domain::DomainError),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}
