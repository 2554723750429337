//! Pins: self-loop edges that hold vertices alive mid-rewrite

use crate::model::Key;
use crate::store::VertexStore;
use crate::Result;
use tracing::trace;

/// Pins taken during one rewrite pass
///
/// A pin is a self-loop reference edge `(k, k)`: it raises the key's count
/// above zero so a freshly built replacement survives until its real
/// parent edge exists. Pinning is coalescing (at most one active self-loop
/// per key per pass), and every pin is released when the pass ends —
/// release order does not matter for correctness, only that nothing is
/// released early, so the stack just pops.
#[derive(Debug, Default)]
pub(crate) struct PinStack {
    keys: Vec<Key>,
}

impl PinStack {
    pub fn new() -> Self {
        PinStack { keys: Vec::new() }
    }

    /// Pin `key`, unless this pass already holds it
    pub fn pin<P>(&mut self, store: &mut VertexStore<P>, key: &Key) -> Result<()> {
        if self.keys.contains(key) {
            return Ok(());
        }
        store.insert_edge(key, key)?;
        trace!(%key, "pin");
        self.keys.push(key.clone());
        Ok(())
    }

    /// Release every pin, cascading collection for anything left unreferenced
    pub fn release_all<P>(&mut self, store: &mut VertexStore<P>) {
        while let Some(key) = self.keys.pop() {
            trace!(%key, "unpin");
            store.erase_edge(&key, &key);
        }
    }
}

impl Drop for PinStack {
    fn drop(&mut self) {
        debug_assert!(self.keys.is_empty(), "pins leaked: {:?}", self.keys);
    }
}
