//! Root handles and the copy-on-write update engine
//!
//! A [`Tree`] owns one root key into a shared [`VertexStore`] and rewrites
//! every ancestor path when a vertex under it changes:
//! - replacements are pinned so collection cannot outrun the rewrite
//! - a version map keeps converging paths from rebuilding an ancestor twice
//! - the superseded root is released once the new one is installed
//!
//! [`VertexStore`]: crate::VertexStore

mod keygen;
mod pin;
mod tree;
mod version_map;

pub use keygen::{KeyGen, SequentialKeys};
pub use tree::Tree;

pub(crate) use pin::PinStack;
pub(crate) use version_map::VersionMap;
