//! Ordered child-key list with set semantics

use super::Key;
use serde::{Deserialize, Serialize};

/// An ordered sequence of child keys without duplicates
///
/// Insertion appends only when the key is absent; removal keeps the
/// relative order of what remains. Duplicate keys in the input are
/// dropped on construction. Null sentinel keys are allowed and may
/// repeat — they stand for "no child here", not for a vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Children(Vec<Key>);

impl Children {
    pub fn new() -> Self {
        Children(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.0.contains(key)
    }

    pub fn get(&self, index: usize) -> Option<&Key> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Key] {
        &self.0
    }

    /// Append `key` unless it is already present; returns whether it was added
    pub fn insert(&mut self, key: impl Into<Key>) -> bool {
        let key = key.into();
        if !key.is_null() && self.0.contains(&key) {
            return false;
        }
        self.0.push(key);
        true
    }

    /// Remove `key`, keeping the order of the remainder; returns whether it was present
    pub fn remove(&mut self, key: &Key) -> bool {
        match self.0.iter().position(|k| k == key) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }
}

impl From<Vec<Key>> for Children {
    fn from(keys: Vec<Key>) -> Self {
        let mut children = Children::new();
        for key in keys {
            children.insert(key);
        }
        children
    }
}

impl FromIterator<Key> for Children {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut children = Children::new();
        for key in iter {
            children.insert(key);
        }
        children
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
