//! Replacement-key derivation

use crate::model::{Key, Vertex};
use std::sync::atomic::{AtomicU64, Ordering};

/// Chooses the key a replacement vertex is stored under
///
/// The store never derives keys itself; rebuilding an ancestor needs a
/// fresh one, and where it comes from is the caller's business. A
/// content-addressed deployment hashes the payload and child keys here;
/// the default just counts.
pub trait KeyGen<P> {
    /// Key for the vertex replacing `current`
    ///
    /// `vertex` carries the rebuilt payload and child list (still under
    /// the old key) so implementations can derive from content.
    fn next_key(&mut self, current: &Key, vertex: &Vertex<P>) -> Key;
}

/// Counter-based key derivation: `stem@n`
///
/// The counter is process-wide, so trees sharing one store never mint the
/// same key. Version suffixes do not pile up: the stem of `b@3` is `b`,
/// and its replacement is `b@n` for the next global `n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialKeys;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

impl<P> KeyGen<P> for SequentialKeys {
    fn next_key(&mut self, current: &Key, _vertex: &Vertex<P>) -> Key {
        let version = NEXT_VERSION.fetch_add(1, Ordering::Relaxed);
        Key::new(format!("{}@{}", current.stem(), version))
    }
}
