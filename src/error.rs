//! Error type for record construction, configuration, and snapshots.
//!
//! Lookups, queue operations, and path queries never fail: they return
//! `Option`/`bool` sentinels the caller must check. `DispatchError` is
//! reserved for rejecting malformed input at the point a record or
//! configuration is built.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors raised while constructing records or parsing external input.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Priority outside the 1..=5 urgency scale.
    #[error("priority {0} is outside the 1..=5 urgency scale")]
    InvalidPriority(u8),

    /// Location string is empty after trimming.
    #[error("location must not be empty")]
    EmptyLocation,

    /// An incident with this id has already been reported.
    #[error("incident {0} has already been reported")]
    DuplicateIncident(String),

    /// A resource with this id is already in the pool.
    #[error("resource {0} is already registered")]
    DuplicateResource(String),

    /// Resource capacity must be a positive integer.
    #[error("resource capacity must be positive, got {0}")]
    InvalidCapacity(u32),

    /// Referenced incident does not exist.
    #[error("unknown incident {0}")]
    UnknownIncident(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON encoding or decoding failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
