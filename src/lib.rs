//! # grove
//!
//! A reference-counted, copy-on-write DAG store.
//!
//! grove keeps a forest of immutable, keyed vertices in a single managed
//! store. Edges point from a vertex to its children, and a reverse edge
//! index doubles as a reference count, so vertices that no longer appear
//! in any live child list are collected automatically. Because vertices
//! are immutable and may be shared by several parents, editing one means
//! inserting a replacement and rebuilding every ancestor up to the root —
//! [`Tree::update`] does this atomically behind a single write lock,
//! pinning in-flight replacements so the collector cannot reclaim them
//! before they are wired in.
//!
//! ## Core Concepts
//!
//! - **Vertices**: immutable nodes with a caller-chosen key, a payload,
//!   and an ordered child-key list
//! - **Reference edges**: `(child, parent)` records that back the
//!   reference count and drive cascading deletion
//! - **Trees**: root handles into a shared store; many trees can share
//!   one store and structurally share subtrees
//! - **Rewrites**: copy-on-write ancestor rebuilds that install a new
//!   root and release the superseded path
//!
//! ## Example
//!
//! ```
//! use grove::{SharedStore, Tree, Vertex};
//!
//! let store = SharedStore::<String>::default();
//! let mut tree = Tree::new(store).unwrap();
//! let root = tree.root().clone();
//! let leaf = Vertex::new("leaf", "hello".to_string());
//! tree.insert_child_vertex(&root, leaf).unwrap();
//! assert!(!tree.empty());
//! ```

pub mod graph;
pub mod model;
pub mod store;
pub mod tree;

mod error;

pub use error::{Error, Result};
pub use graph::{
    filter_fn, BreadthFirst, EdgeFilter, FilterFn, FollowAll, InOrder, MaxDepth, PostOrder,
    PreOrder,
};
pub use model::{Children, Key, Vertex};
pub use store::{SharedStore, VertexStore};
pub use tree::{KeyGen, SequentialKeys, Tree};
