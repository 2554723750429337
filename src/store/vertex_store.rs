//! Managed vertex map with reference counting
//!
//! Vertices are stored by their own key; every non-null child occurrence
//! adds a `(child, parent)` entry to the reverse index. Erasing a vertex
//! (or the last edge naming it) walks the newly unreferenced frontier
//! breadth-first and removes everything that nothing retains. A whole
//! rewrite pass must see stable counts between its read and write steps,
//! so shared stores are wrapped in a single coarse lock ([`SharedStore`])
//! and mutated by one writer at a time.

use crate::model::{Key, Vertex};
use crate::store::EdgeIndex;
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::{btree_map, BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace};

/// A vertex store shared between trees; all mutation serializes on the lock
pub type SharedStore<P> = Arc<RwLock<VertexStore<P>>>;

/// Reference-counted storage for immutable keyed vertices
#[derive(Debug)]
pub struct VertexStore<P> {
    vertices: BTreeMap<Key, Vertex<P>>,
    edges: EdgeIndex,
}

impl<P> Default for VertexStore<P> {
    fn default() -> Self {
        VertexStore::new()
    }
}

impl<P> VertexStore<P> {
    pub fn new() -> Self {
        VertexStore {
            vertices: BTreeMap::new(),
            edges: EdgeIndex::new(),
        }
    }

    /// Wrap this store for sharing between trees
    pub fn into_shared(self) -> SharedStore<P> {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.vertices.contains_key(key)
    }

    /// Find the vertex stored under the given key
    pub fn get(&self, key: &Key) -> Option<&Vertex<P>> {
        self.vertices.get(key)
    }

    /// Iterate over all stored vertices in key order
    pub fn iter(&self) -> btree_map::Values<'_, Key, Vertex<P>> {
        self.vertices.values()
    }

    /// Number of reference edges naming `key` as child
    pub fn ref_count(&self, key: &Key) -> usize {
        self.edges.count(key)
    }

    /// Total number of reference edges, pins included
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Parents currently referencing `key`, in edge insertion order
    pub fn parents_of(&self, key: &Key) -> &[Key] {
        self.edges.parents_of(key)
    }

    pub fn contains_edge(&self, child: &Key, parent: &Key) -> bool {
        self.edges.contains(child, parent)
    }

    /// Insert a vertex, recording an edge to each of its non-null children
    ///
    /// Every non-null child must already be stored, which keeps the graph
    /// acyclic by construction. Re-inserting a vertex identical to the one
    /// already stored under its key is a no-op returning the existing key;
    /// an occupied key with different content is an error.
    pub fn insert(&mut self, vertex: Vertex<P>) -> Result<Key>
    where
        P: PartialEq,
    {
        let key = vertex.key().clone();
        if let Some(existing) = self.vertices.get(&key) {
            if *existing == vertex {
                trace!(%key, "insert deduplicated");
                return Ok(key);
            }
            return Err(Error::Occupied(key));
        }
        for child in vertex.live_children() {
            if !self.vertices.contains_key(child) {
                return Err(Error::MissingChild {
                    child: child.clone(),
                    parent: key,
                });
            }
        }
        for child in vertex.live_children() {
            self.edges.insert(child, &key);
        }
        trace!(%key, children = vertex.children().len(), "insert vertex");
        self.vertices.insert(key.clone(), vertex);
        Ok(key)
    }

    /// Remove the vertex at `key`
    ///
    /// The vertex must be unreferenced; erasing a vertex something still
    /// points at is a caller error, not a recoverable state. Its child
    /// edges are removed, cascading deletion through anything that drops
    /// to zero references.
    pub fn erase(&mut self, key: &Key) -> Result<()> {
        let count = self.edges.count(key);
        if count > 0 {
            return Err(Error::InUse {
                key: key.clone(),
                count,
            });
        }
        let vertex = self
            .vertices
            .remove(key)
            .ok_or_else(|| Error::NotFound(key.clone()))?;
        debug!(%key, "erase vertex");
        let seeds = vertex
            .live_children()
            .map(|child| (child.clone(), key.clone()))
            .collect();
        self.collect(seeds);
        Ok(())
    }

    /// Insert a reference edge; both endpoints must be stored
    pub fn insert_edge(&mut self, child: &Key, parent: &Key) -> Result<()> {
        if !self.vertices.contains_key(parent) {
            return Err(Error::NotFound(parent.clone()));
        }
        if !self.vertices.contains_key(child) {
            return Err(Error::MissingChild {
                child: child.clone(),
                parent: parent.clone(),
            });
        }
        self.edges.insert(child, parent);
        trace!(%child, %parent, "insert edge");
        Ok(())
    }

    /// Remove one matching edge, cascading deletion when it was the last
    ///
    /// Returns whether an edge was removed.
    pub fn erase_edge(&mut self, child: &Key, parent: &Key) -> bool {
        if !self.edges.contains(child, parent) {
            return false;
        }
        self.collect(VecDeque::from([(child.clone(), parent.clone())]));
        true
    }

    /// Drop all vertices and edges unconditionally
    pub fn clear(&mut self) {
        self.edges.clear();
        self.vertices.clear();
    }

    /// Cascading deletion over the no-longer-referenced frontier
    ///
    /// Each queued `(child, parent)` edge is removed; a child left with
    /// zero references is evicted and its own child edges are queued in
    /// turn. Breadth-first and iterative, so deep chains cannot overflow
    /// the stack, and a vertex is only inspected once its last edge is
    /// gone.
    fn collect(&mut self, mut queue: VecDeque<(Key, Key)>) {
        let mut collected = 0usize;
        while let Some((child, parent)) = queue.pop_front() {
            self.edges.remove(&child, &parent);
            if self.edges.count(&child) > 0 {
                continue;
            }
            if let Some(vertex) = self.vertices.remove(&child) {
                collected += 1;
                for grandchild in vertex.live_children() {
                    queue.push_back((grandchild.clone(), child.clone()));
                }
            }
        }
        if collected > 0 {
            debug!(collected, "collected unreferenced vertices");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VertexStore<&'static str> {
        VertexStore::new()
    }

    #[test]
    fn test_insert_records_edges() {
        let mut s = store();
        s.insert(Vertex::new("b", "leaf")).unwrap();
        s.insert(Vertex::new("c", "leaf")).unwrap();
        s.insert(Vertex::new("a", "branch").with_child("b").with_child("c"))
            .unwrap();
        assert_eq!(s.ref_count(&Key::from("b")), 1);
        assert_eq!(s.ref_count(&Key::from("c")), 1);
        assert_eq!(s.ref_count(&Key::from("a")), 0);
        assert!(s.contains_edge(&Key::from("b"), &Key::from("a")));
    }

    #[test]
    fn test_insert_missing_child() {
        let mut s = store();
        let err = s
            .insert(Vertex::new("a", "branch").with_child("ghost"))
            .unwrap_err();
        assert_eq!(
            err,
            Error::MissingChild {
                child: Key::from("ghost"),
                parent: Key::from("a"),
            }
        );
        // validation happens before any mutation
        assert!(s.is_empty());
        assert_eq!(s.edge_count(), 0);
    }

    #[test]
    fn test_insert_null_children_carry_no_edges() {
        let mut s = store();
        s.insert(Vertex::new("g", "node").with_child(Key::null()).with_child(Key::null()))
            .unwrap();
        assert_eq!(s.edge_count(), 0);
    }

    #[test]
    fn test_insert_dedup_and_conflict() {
        let mut s = store();
        s.insert(Vertex::new("a", "one")).unwrap();
        assert_eq!(s.insert(Vertex::new("a", "one")).unwrap(), Key::from("a"));
        assert_eq!(s.len(), 1);
        assert_eq!(s.edge_count(), 0);
        assert_eq!(
            s.insert(Vertex::new("a", "two")).unwrap_err(),
            Error::Occupied(Key::from("a"))
        );
    }

    #[test]
    fn test_erase_requires_zero_references() {
        let mut s = store();
        s.insert(Vertex::new("b", "leaf")).unwrap();
        s.insert(Vertex::new("a", "branch").with_child("b")).unwrap();
        assert_eq!(
            s.erase(&Key::from("b")).unwrap_err(),
            Error::InUse {
                key: Key::from("b"),
                count: 1,
            }
        );
    }

    #[test]
    fn test_erase_cascades() {
        let mut s = store();
        s.insert(Vertex::new("d", "leaf")).unwrap();
        s.insert(Vertex::new("b", "branch").with_child("d")).unwrap();
        s.insert(Vertex::new("c", "leaf")).unwrap();
        s.insert(Vertex::new("a", "root").with_child("b").with_child("c"))
            .unwrap();
        s.erase(&Key::from("a")).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.edge_count(), 0);
    }

    #[test]
    fn test_cascade_stops_at_shared_vertices() {
        let mut s = store();
        s.insert(Vertex::new("shared", "leaf")).unwrap();
        s.insert(Vertex::new("a", "branch").with_child("shared")).unwrap();
        s.insert(Vertex::new("b", "branch").with_child("shared")).unwrap();
        s.erase(&Key::from("a")).unwrap();
        assert!(s.contains(&Key::from("shared")));
        assert_eq!(s.ref_count(&Key::from("shared")), 1);
    }

    #[test]
    fn test_erase_edge_collects_last_reference() {
        let mut s = store();
        s.insert(Vertex::new("d", "leaf")).unwrap();
        s.insert(Vertex::new("b", "branch").with_child("d")).unwrap();
        // simulate a pin keeping b alive
        s.insert_edge(&Key::from("b"), &Key::from("b")).unwrap();
        assert!(s.erase_edge(&Key::from("b"), &Key::from("b")));
        assert!(!s.contains(&Key::from("b")));
        assert!(!s.contains(&Key::from("d")));
        assert!(!s.erase_edge(&Key::from("b"), &Key::from("b")));
    }

    #[test]
    fn test_deep_chain_collection_is_iterative() {
        let mut s = VertexStore::new();
        s.insert(Vertex::new("n0", 0u32)).unwrap();
        for i in 1..10_000u32 {
            s.insert(Vertex::new(format!("n{i}"), i).with_child(format!("n{}", i - 1)))
                .unwrap();
        }
        s.erase(&Key::from("n9999")).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut s = store();
        s.insert(Vertex::new("b", "leaf")).unwrap();
        s.insert(Vertex::new("a", "branch").with_child("b")).unwrap();
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.edge_count(), 0);
    }
}
