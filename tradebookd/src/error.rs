//! Daemon error types.

use thiserror::Error;
use tradebook_domain::{DomainError, TradeId};
use tradebook_store::StoreError;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Trade not found
    #[error("Trade not found: {0}")]
    TradeNotFound(TradeId),

    /// Malformed tick or import input
    #[error("Invalid input: {0}")]
    Input(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
