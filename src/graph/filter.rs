//! Edge predicates for traversal

use crate::model::Key;
use std::collections::BTreeMap;

/// Decides whether a traversal may follow the edge `parent -> child`
///
/// Filters may carry state (see [`MaxDepth`]); wrap a plain closure with
/// [`filter_fn`].
pub trait EdgeFilter {
    fn follow(&mut self, parent: &Key, child: &Key) -> bool;
}

/// A closure adapted into an [`EdgeFilter`]
pub struct FilterFn<F>(F);

/// Wrap an `FnMut(&Key, &Key) -> bool` closure as an [`EdgeFilter`]
pub fn filter_fn<F>(f: F) -> FilterFn<F>
where
    F: FnMut(&Key, &Key) -> bool,
{
    FilterFn(f)
}

impl<F> EdgeFilter for FilterFn<F>
where
    F: FnMut(&Key, &Key) -> bool,
{
    fn follow(&mut self, parent: &Key, child: &Key) -> bool {
        (self.0)(parent, child)
    }
}

/// Follows every edge
#[derive(Clone, Copy, Debug, Default)]
pub struct FollowAll;

impl EdgeFilter for FollowAll {
    fn follow(&mut self, _parent: &Key, _child: &Key) -> bool {
        true
    }
}

/// Caps traversal depth, tracking per-key depth in a side map
///
/// The starting vertex sits at depth zero; an edge is followed while its
/// parent is shallower than the limit. A key keeps the depth it was first
/// seen at.
#[derive(Clone, Debug)]
pub struct MaxDepth {
    limit: u64,
    depths: BTreeMap<Key, u64>,
}

impl MaxDepth {
    pub fn new(limit: u64) -> Self {
        MaxDepth {
            limit,
            depths: BTreeMap::new(),
        }
    }
}

impl EdgeFilter for MaxDepth {
    fn follow(&mut self, parent: &Key, child: &Key) -> bool {
        let depth = *self.depths.entry(parent.clone()).or_insert(0);
        self.depths.entry(child.clone()).or_insert(depth + 1);
        depth < self.limit
    }
}
