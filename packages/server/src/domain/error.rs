//! Errors shared across the domain interfaces.

use thiserror::Error;

/// Errors returned by [`crate::domain::ChatStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write violated a store-level invariant.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// A store operation did not complete within the configured bound.
    #[error("store operation timed out")]
    Timeout,
}

/// Errors returned by [`crate::domain::EventPusher`] implementations.
#[derive(Debug, Error, PartialEq)]
pub enum PushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("failed to push event: {0}")]
    PushFailed(String),
}
