//! Traversal iterators
//!
//! Each iterator borrows the store for its whole walk, so the snapshot is
//! stable by construction. Shared subtrees (a DAG child with several
//! parents) are visited once per path by the depth-first orders and once
//! overall by [`BreadthFirst`], which deduplicates by key.

use crate::graph::{EdgeFilter, FollowAll};
use crate::model::{Key, Vertex};
use crate::store::VertexStore;
use std::collections::{BTreeSet, VecDeque};

/// Breadth-first walk from a starting vertex
///
/// Yields each reachable vertex once, nearest first.
pub struct BreadthFirst<'a, P, F = FollowAll> {
    vertices: &'a VertexStore<P>,
    queue: VecDeque<Key>,
    visited: BTreeSet<Key>,
    filter: F,
}

impl<'a, P> BreadthFirst<'a, P> {
    pub fn new(vertices: &'a VertexStore<P>, start: &Key) -> Self {
        Self::with_filter(vertices, start, FollowAll)
    }
}

impl<'a, P, F: EdgeFilter> BreadthFirst<'a, P, F> {
    pub fn with_filter(vertices: &'a VertexStore<P>, start: &Key, filter: F) -> Self {
        let mut queue = VecDeque::new();
        let mut visited = BTreeSet::new();
        if vertices.contains(start) {
            queue.push_back(start.clone());
            visited.insert(start.clone());
        }
        BreadthFirst {
            vertices,
            queue,
            visited,
            filter,
        }
    }
}

impl<'a, P, F: EdgeFilter> Iterator for BreadthFirst<'a, P, F> {
    type Item = &'a Vertex<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let vertices = self.vertices;
        loop {
            let key = self.queue.pop_front()?;
            let Some(vertex) = vertices.get(&key) else {
                continue;
            };
            for child in vertex.live_children() {
                if self.visited.contains(child) || !vertices.contains(child) {
                    continue;
                }
                if self.filter.follow(&key, child) {
                    self.visited.insert(child.clone());
                    self.queue.push_back(child.clone());
                }
            }
            return Some(vertex);
        }
    }
}

/// Depth-first walk yielding a vertex before its children
pub struct PreOrder<'a, P, F = FollowAll> {
    vertices: &'a VertexStore<P>,
    stack: Vec<Key>,
    filter: F,
}

impl<'a, P> PreOrder<'a, P> {
    pub fn new(vertices: &'a VertexStore<P>, start: &Key) -> Self {
        Self::with_filter(vertices, start, FollowAll)
    }
}

impl<'a, P, F: EdgeFilter> PreOrder<'a, P, F> {
    pub fn with_filter(vertices: &'a VertexStore<P>, start: &Key, filter: F) -> Self {
        let mut stack = Vec::new();
        if vertices.contains(start) {
            stack.push(start.clone());
        }
        PreOrder {
            vertices,
            stack,
            filter,
        }
    }
}

impl<'a, P, F: EdgeFilter> Iterator for PreOrder<'a, P, F> {
    type Item = &'a Vertex<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let vertices = self.vertices;
        loop {
            let key = self.stack.pop()?;
            let Some(vertex) = vertices.get(&key) else {
                continue;
            };
            // reversed so the first child is popped first
            for child in vertex.children().as_slice().iter().rev() {
                if child.is_null() || !vertices.contains(child) {
                    continue;
                }
                if self.filter.follow(&key, child) {
                    self.stack.push(child.clone());
                }
            }
            return Some(vertex);
        }
    }
}

/// Depth-first walk yielding a vertex after all its children
pub struct PostOrder<'a, P, F = FollowAll> {
    vertices: &'a VertexStore<P>,
    /// Frames of (key, index of the next child to descend into)
    stack: Vec<(Key, usize)>,
    filter: F,
}

impl<'a, P> PostOrder<'a, P> {
    pub fn new(vertices: &'a VertexStore<P>, start: &Key) -> Self {
        Self::with_filter(vertices, start, FollowAll)
    }
}

impl<'a, P, F: EdgeFilter> PostOrder<'a, P, F> {
    pub fn with_filter(vertices: &'a VertexStore<P>, start: &Key, filter: F) -> Self {
        let mut stack = Vec::new();
        if vertices.contains(start) {
            stack.push((start.clone(), 0));
        }
        PostOrder {
            vertices,
            stack,
            filter,
        }
    }
}

impl<'a, P, F: EdgeFilter> Iterator for PostOrder<'a, P, F> {
    type Item = &'a Vertex<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let vertices = self.vertices;
        loop {
            let (key, index) = match self.stack.last() {
                Some((key, index)) => (key.clone(), *index),
                None => return None,
            };
            let Some(vertex) = vertices.get(&key) else {
                self.stack.pop();
                continue;
            };
            if index < vertex.children().len() {
                if let Some(frame) = self.stack.last_mut() {
                    frame.1 = index + 1;
                }
                if let Some(child) = vertex.children().get(index) {
                    if !child.is_null()
                        && vertices.contains(child)
                        && self.filter.follow(&key, child)
                    {
                        self.stack.push((child.clone(), 0));
                    }
                }
                continue;
            }
            self.stack.pop();
            return Some(vertex);
        }
    }
}

/// In-order walk over binary vertices
///
/// Matches the shape the store uses for binary trees: a vertex with
/// exactly two children has a left and a right branch, and null keys
/// stand in for missing branches. Vertices with any other arity are
/// treated as leaves.
pub struct InOrder<'a, P, F = FollowAll> {
    vertices: &'a VertexStore<P>,
    stack: Vec<Key>,
    descend: Option<Key>,
    filter: F,
}

impl<'a, P> InOrder<'a, P> {
    pub fn new(vertices: &'a VertexStore<P>, start: &Key) -> Self {
        Self::with_filter(vertices, start, FollowAll)
    }
}

impl<'a, P, F: EdgeFilter> InOrder<'a, P, F> {
    pub fn with_filter(vertices: &'a VertexStore<P>, start: &Key, filter: F) -> Self {
        let descend = vertices.contains(start).then(|| start.clone());
        InOrder {
            vertices,
            stack: Vec::new(),
            descend,
            filter,
        }
    }

    /// The branch child at `index`, when it can be followed
    fn branch(&mut self, vertex: &Vertex<P>, index: usize) -> Option<Key> {
        if vertex.children().len() != 2 {
            return None;
        }
        let child = vertex.children().get(index)?;
        if child.is_null() || !self.vertices.contains(child) {
            return None;
        }
        self.filter
            .follow(vertex.key(), child)
            .then(|| child.clone())
    }
}

impl<'a, P, F: EdgeFilter> Iterator for InOrder<'a, P, F> {
    type Item = &'a Vertex<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let vertices = self.vertices;
        // walk to the bottom of the left spine
        while let Some(key) = self.descend.take() {
            if let Some(vertex) = vertices.get(&key) {
                self.stack.push(key);
                self.descend = self.branch(vertex, 0);
            }
        }
        let key = self.stack.pop()?;
        let vertex = vertices.get(&key)?;
        // the right branch is the next subtree to exhaust
        self.descend = self.branch(vertex, 1);
        Some(vertex)
    }
}
