//! Vertex key type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a vertex (caller-assigned, not a content hash)
///
/// Keys are opaque to the store: total ordering and equality are all it
/// relies on. The empty key is the "absent child" sentinel used as a
/// placeholder in child lists (e.g. the missing branch of a binary node);
/// it never resolves to a stored vertex and never carries reference edges.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    /// Create a new key
    pub fn new(key: impl Into<String>) -> Self {
        Key(key.into())
    }

    /// The absent-child sentinel
    pub fn null() -> Self {
        Key(String::new())
    }

    /// Check whether this is the absent-child sentinel
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key with any `@`-version suffix stripped
    ///
    /// [`SequentialKeys`](crate::SequentialKeys) derives replacement keys
    /// as `stem@n`; taking the stem first keeps versions from piling up.
    pub fn stem(&self) -> &str {
        match self.0.split_once('@') {
            Some((stem, _)) => stem,
            None => &self.0,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}
