//! Read-only traversal over a store snapshot
//!
//! Iterators here never mutate the store: they consume a shared borrow,
//! a vertex's key and ordered child list, and an injected [`EdgeFilter`]
//! deciding which edges may be followed. A child key that is null or does
//! not resolve is treated as "no such child", never as an error.

mod filter;
mod traversal;

pub use filter::{filter_fn, EdgeFilter, FilterFn, FollowAll, MaxDepth};
pub use traversal::{BreadthFirst, InOrder, PostOrder, PreOrder};
