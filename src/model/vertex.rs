//! Vertex (node) type - the unit of storage

use super::{Children, Key};
use serde::{Deserialize, Serialize};

/// An immutable keyed node with a payload and an ordered child-key list
///
/// A vertex is a value: "changing" one always means building a new vertex
/// and inserting it, never mutating stored state. The key is chosen by the
/// caller and is the identity the store files the vertex under; it is not
/// derived from the payload or the children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex<P> {
    /// Identity within the store
    pub key: Key,

    /// Caller-defined content
    pub payload: P,

    /// Ordered child keys; empty keys are absent-child placeholders
    pub children: Children,
}

impl<P> Vertex<P> {
    /// Create a leaf vertex
    pub fn new(key: impl Into<Key>, payload: P) -> Self {
        Vertex {
            key: key.into(),
            payload,
            children: Children::new(),
        }
    }

    /// Set the child list
    pub fn with_children(mut self, children: impl Into<Children>) -> Self {
        self.children = children.into();
        self
    }

    /// Append a single child key
    pub fn with_child(mut self, key: impl Into<Key>) -> Self {
        self.children.insert(key);
        self
    }

    /// Re-key this vertex, e.g. when deriving a replacement version
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Child keys that can resolve to stored vertices (null placeholders skipped)
    pub fn live_children(&self) -> impl Iterator<Item = &Key> {
        self.children.iter().filter(|key| !key.is_null())
    }

    pub fn is_leaf(&self) -> bool {
        self.live_children().next().is_none()
    }
}
