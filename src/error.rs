//! Error types for grove

use crate::model::Key;
use thiserror::Error;

/// Result type alias for grove operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in grove operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("vertex not found: {0}")]
    NotFound(Key),

    #[error("key {0} is already occupied by a different vertex")]
    Occupied(Key),

    #[error("child {child} of {parent} does not resolve to a stored vertex")]
    MissingChild { child: Key, parent: Key },

    #[error("vertex {key} is still referenced by {count} edge(s)")]
    InUse { key: Key, count: usize },
}
