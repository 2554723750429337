//! Tree: a root handle into a shared store, plus the rewrite engine

use crate::model::{Key, Vertex};
use crate::store::{SharedStore, VertexStore};
use crate::tree::{KeyGen, PinStack, SequentialKeys, VersionMap};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// A root handle over a shared [`VertexStore`]
///
/// Several trees may share one store; each pins its own root with a
/// self-loop edge for as long as it lives, so one tree swapping roots
/// never collects a vertex another tree still anchors. All mutating
/// operations take the store's write lock for their whole duration — a
/// rewrite depends on reference counts staying stable between discovering
/// parents and rebuilding them.
///
/// Dropping a tree releases its root pin, which acquires the write lock;
/// do not drop a tree while holding a guard on its store.
pub struct Tree<P> {
    store: SharedStore<P>,
    root: Key,
    keygen: Box<dyn KeyGen<P> + Send>,
}

impl<P> Tree<P>
where
    P: Clone + PartialEq,
{
    /// Create a tree with a fresh empty root vertex
    ///
    /// The root is stored under the null key with a default payload; a
    /// second tree created on the same store deduplicates onto the same
    /// root vertex and holds its own pin on it.
    pub fn new(store: SharedStore<P>) -> Result<Self>
    where
        P: Default,
    {
        let root = {
            let mut vertices = store.write();
            let root = vertices.insert(Vertex::new(Key::null(), P::default()))?;
            vertices.insert_edge(&root, &root)?;
            root
        };
        Ok(Tree {
            store,
            root,
            keygen: Box::new(SequentialKeys),
        })
    }

    /// Adopt an existing vertex as this tree's root
    pub fn with_root(store: SharedStore<P>, root: impl Into<Key>) -> Result<Self> {
        let root = root.into();
        {
            let mut vertices = store.write();
            if !vertices.contains(&root) {
                return Err(Error::NotFound(root));
            }
            vertices.insert_edge(&root, &root)?;
        }
        Ok(Tree {
            store,
            root,
            keygen: Box::new(SequentialKeys),
        })
    }

    /// Use a caller-supplied replacement-key scheme
    pub fn with_keygen(mut self, keygen: impl KeyGen<P> + Send + 'static) -> Self {
        self.keygen = Box::new(keygen);
        self
    }

    /// Replace a vertex and rebuild every ancestor path up to the root
    ///
    /// `value` is inserted as-is (its key is the caller's choice); then
    /// every chain of parents from `source` to the root is rebuilt as new
    /// vertices referencing the replacements, and the last rebuilt
    /// ancestor — the one that was root — takes over as root. Branches
    /// that never reach the root are rolled back. Reinserting a vertex
    /// identical to `source`'s is a no-op. Returns the key `value` was
    /// stored under, however many ancestors were rebuilt.
    pub fn update(&mut self, source: &Key, value: Vertex<P>) -> Result<Key> {
        let store = Arc::clone(&self.store);
        let mut vertices = store.write();
        self.update_in(&mut vertices, source, value)
    }

    /// Link an already-stored vertex as a child of `parent`
    ///
    /// No-op returning `parent`'s key when the link already exists.
    pub fn insert_child(&mut self, parent: &Key, child: &Key) -> Result<Key> {
        let store = Arc::clone(&self.store);
        let mut vertices = store.write();
        self.insert_child_in(&mut vertices, parent, child)
    }

    /// Store `child`, then link it as a child of `parent`
    pub fn insert_child_vertex(&mut self, parent: &Key, child: Vertex<P>) -> Result<Key> {
        let store = Arc::clone(&self.store);
        let mut vertices = store.write();
        if !vertices.contains(parent) {
            return Err(Error::NotFound(parent.clone()));
        }
        let child_key = vertices.insert(child)?;
        self.insert_child_in(&mut vertices, parent, &child_key)
    }

    /// Unlink `child` from `parent`, collecting it if nothing else refers to it
    ///
    /// No-op returning `parent`'s key when there was no such link.
    pub fn erase_child(&mut self, parent: &Key, child: &Key) -> Result<Key> {
        let store = Arc::clone(&self.store);
        let mut vertices = store.write();
        let parent_vertex = vertices
            .get(parent)
            .ok_or_else(|| Error::NotFound(parent.clone()))?
            .clone();
        let mut children = parent_vertex.children().clone();
        if !children.remove(child) {
            return Ok(parent.clone());
        }
        let rebuilt = parent_vertex.with_children(children);
        let next_key = self.keygen.next_key(parent, &rebuilt);
        self.update_in(&mut vertices, parent, rebuilt.with_key(next_key))
    }

    /// Replace a vertex's payload, keeping its children
    pub fn replace_payload(&mut self, source: &Key, payload: P) -> Result<Key> {
        let store = Arc::clone(&self.store);
        let mut vertices = store.write();
        let mut rebuilt = vertices
            .get(source)
            .ok_or_else(|| Error::NotFound(source.clone()))?
            .clone();
        rebuilt.payload = payload;
        let next_key = self.keygen.next_key(source, &rebuilt);
        self.update_in(&mut vertices, source, rebuilt.with_key(next_key))
    }

    fn insert_child_in(
        &mut self,
        vertices: &mut VertexStore<P>,
        parent: &Key,
        child: &Key,
    ) -> Result<Key> {
        if !vertices.contains(child) {
            return Err(Error::NotFound(child.clone()));
        }
        let parent_vertex = vertices
            .get(parent)
            .ok_or_else(|| Error::NotFound(parent.clone()))?
            .clone();
        if parent_vertex.children().contains(child) {
            return Ok(parent.clone());
        }
        let rebuilt = parent_vertex.with_child(child.clone());
        let next_key = self.keygen.next_key(parent, &rebuilt);
        self.update_in(vertices, parent, rebuilt.with_key(next_key))
    }

    fn update_in(
        &mut self,
        vertices: &mut VertexStore<P>,
        source: &Key,
        value: Vertex<P>,
    ) -> Result<Key> {
        if !vertices.contains(source) {
            return Err(Error::NotFound(source.clone()));
        }
        let target = vertices.insert(value.clone())?;
        if target == *source {
            // identical reinsertion, nothing to propagate
            return Ok(target);
        }
        debug!(%source, %target, "update");
        let mut mapping = VersionMap::new();
        mapping.record(source, &target);
        let mut queue = VecDeque::new();
        self.seed_parents(vertices, &value, &mapping, source, &mut queue);
        if *source == self.root {
            self.swap_root(vertices, target.clone())?;
        }
        let mut pins = PinStack::new();
        let outcome = self.rewrite(vertices, &value, &mut mapping, &mut pins, &mut queue);
        pins.release_all(vertices);
        outcome?;
        Ok(target)
    }

    /// Drain the rewrite queue, rebuilding one ancestor per edge
    fn rewrite(
        &mut self,
        vertices: &mut VertexStore<P>,
        value: &Vertex<P>,
        mapping: &mut VersionMap,
        pins: &mut PinStack,
        queue: &mut VecDeque<(Key, Key)>,
    ) -> Result<()> {
        while let Some((old_child, old_parent)) = queue.pop_front() {
            let parent = mapping.resolve(&old_parent);
            let child = mapping.resolve(&old_child);
            if !vertices.contains(&child) {
                continue;
            }
            let Some(parent_vertex) = vertices.get(&parent) else {
                continue;
            };
            // swap the child (or any superseded version of it the parent
            // was wired to by an earlier converging path) for the newest one
            let mut children = parent_vertex.children().clone();
            children.remove(&old_child);
            for alias in mapping.aliases(&old_child) {
                children.remove(alias);
            }
            children.insert(child.clone());
            if children == *parent_vertex.children() {
                // converging path: this ancestor already points at the
                // replacement, no new version needed
                continue;
            }
            let rebuilt = parent_vertex.clone().with_children(children);
            pins.pin(vertices, &child)?;
            let next_key = self.keygen.next_key(&parent, &rebuilt);
            let replacement = vertices.insert(rebuilt.with_key(next_key))?;
            if parent == self.root {
                mapping.record(&old_parent, &replacement);
                self.swap_root(vertices, replacement)?;
            } else {
                let before = queue.len();
                self.seed_parents(vertices, value, mapping, &old_parent, queue);
                if queue.len() == before {
                    // dead end: this branch cannot reach the root
                    debug!(key = %replacement, "abandoning rewrite branch");
                    vertices.erase(&replacement)?;
                } else {
                    mapping.record(&old_parent, &replacement);
                    if parent != old_parent && vertices.ref_count(&parent) == 0 {
                        // an earlier replacement for this ancestor was
                        // superseded before being wired anywhere
                        vertices.erase(&parent)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Queue rewrite work for every parent of `child`
    ///
    /// Skips the root as child (the root swap covers it), pin self-loops,
    /// the new vertex itself, parents the new vertex already lists as
    /// children, vertices this pass minted (those are rewired through the
    /// mapping, never rebuilt from), and parents that neither have parents
    /// of their own nor are the root — such a parent cannot lead anywhere.
    fn seed_parents(
        &self,
        vertices: &VertexStore<P>,
        value: &Vertex<P>,
        mapping: &VersionMap,
        child: &Key,
        queue: &mut VecDeque<(Key, Key)>,
    ) {
        if *child == self.root {
            return;
        }
        for parent in vertices.parents_of(child) {
            if parent == child {
                continue;
            }
            if parent == value.key() {
                continue;
            }
            if value.children().contains(parent) {
                continue;
            }
            if mapping.is_replacement(parent) {
                continue;
            }
            if vertices.ref_count(parent) == 0 && *parent != self.root {
                continue;
            }
            queue.push_back((child.clone(), parent.clone()));
        }
    }

    /// Install `new_root` and release the superseded root
    ///
    /// The new root takes a pin before the old one loses its pin, so a
    /// shared subtree is never momentarily unreferenced in between.
    fn swap_root(&mut self, vertices: &mut VertexStore<P>, new_root: Key) -> Result<()> {
        if new_root == self.root {
            return Ok(());
        }
        vertices.insert_edge(&new_root, &new_root)?;
        let old_root = std::mem::replace(&mut self.root, new_root);
        debug!(old = %old_root, new = %self.root, "root replaced");
        vertices.erase_edge(&old_root, &old_root);
        Ok(())
    }
}

impl<P> Tree<P> {
    /// The current root key
    pub fn root(&self) -> &Key {
        &self.root
    }

    /// Whether the root vertex has no children
    pub fn empty(&self) -> bool {
        let vertices = self.store.read();
        vertices
            .get(&self.root)
            .map_or(true, |vertex| vertex.children().is_empty())
    }

    /// The shared store this tree roots into
    pub fn vertices(&self) -> &SharedStore<P> {
        &self.store
    }

    /// Cloned copy of the vertex stored under `key`
    pub fn get(&self, key: &Key) -> Option<Vertex<P>>
    where
        P: Clone,
    {
        self.store.read().get(key).cloned()
    }
}

impl<P> Drop for Tree<P> {
    fn drop(&mut self) {
        let mut vertices = self.store.write();
        vertices.erase_edge(&self.root, &self.root);
    }
}
