// Chunk: docs/chunks/storage_errors - Precondition, stale-cursor and consistency errors

//! Error taxonomy for the storage engine.
//!
//! Precondition violations are reported before anything is mutated, so a caller
//! that receives one still holds a valid buffer. `StaleIterator` is kept separate
//! from the range errors to make cursor lifetime bugs easy to spot.

use thiserror::Error;

/// Errors returned by the character buffer, style buffer and styled text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A range whose start lies after its limit.
    #[error("inverted range: start {start} is greater than limit {limit}")]
    InvertedRange { start: usize, limit: usize },

    /// An offset outside the valid bounds of the text.
    #[error("offset {offset} is out of bounds for length {len}")]
    OutOfBounds { offset: usize, len: usize },

    /// A cursor was used after its buffer was mutated, or on a different buffer.
    #[error("stale iterator: the buffer changed after the cursor was created")]
    StaleIterator,

    /// The run table is not in the state an operation requires.
    #[error("inconsistent run table: {0}")]
    Inconsistent(&'static str),

    /// A `StorageConfig` value was rejected.
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Checks `start <= limit <= len`.
pub(crate) fn check_range(start: usize, limit: usize, len: usize) -> Result<()> {
    if start > limit {
        return Err(StorageError::InvertedRange { start, limit });
    }
    if limit > len {
        return Err(StorageError::OutOfBounds { offset: limit, len });
    }
    Ok(())
}

/// Checks `offset <= len` (the end of text is a valid position).
pub(crate) fn check_offset(offset: usize, len: usize) -> Result<()> {
    if offset > len {
        return Err(StorageError::OutOfBounds { offset, len });
    }
    Ok(())
}

/// Logs and builds an `Inconsistent` error.
pub(crate) fn inconsistent(what: &'static str) -> StorageError {
    tracing::error!(what, "run table consistency check failed");
    StorageError::Inconsistent(what)
}
