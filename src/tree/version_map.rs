//! Old-version to replacement correspondence for one rewrite pass

use crate::model::Key;
use std::collections::{BTreeMap, BTreeSet};

/// Memoization of "this vertex was replaced by that one"
///
/// Keyed by the original key as observed when the replacement was built.
/// When two paths converge on a shared ancestor, the second path resolves
/// to the replacement the first one produced instead of rebuilding it
/// from scratch. An ancestor may be replaced more than once in one pass
/// (once per converging path); every version is remembered, so a parent
/// that was wired to an earlier version can be rewired to the newest one
/// instead of ending up carrying both.
#[derive(Debug, Default)]
pub(crate) struct VersionMap {
    versions: BTreeMap<Key, Vec<Key>>,
    replacements: BTreeSet<Key>,
}

impl VersionMap {
    pub fn new() -> Self {
        VersionMap {
            versions: BTreeMap::new(),
            replacements: BTreeSet::new(),
        }
    }

    /// Record `old -> new`; identical keys record nothing
    pub fn record(&mut self, old: &Key, new: &Key) {
        if old == new {
            return;
        }
        self.versions
            .entry(old.clone())
            .or_default()
            .push(new.clone());
        self.replacements.insert(new.clone());
    }

    /// The newest recorded replacement for `key`, or `key` itself
    ///
    /// The result may have been collected since it was recorded; callers
    /// re-validate against the current store before using it.
    pub fn resolve(&self, key: &Key) -> Key {
        self.versions
            .get(key)
            .and_then(|versions| versions.last())
            .unwrap_or(key)
            .clone()
    }

    /// Every replacement recorded for `key`, oldest first
    pub fn aliases(&self, key: &Key) -> &[Key] {
        self.versions.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether `key` was minted by this pass
    pub fn is_replacement(&self, key: &Key) -> bool {
        self.replacements.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_identity() {
        let map = VersionMap::new();
        assert_eq!(map.resolve(&Key::from("a")), Key::from("a"));
        assert!(map.aliases(&Key::from("a")).is_empty());
    }

    #[test]
    fn test_resolve_returns_newest_version() {
        let mut map = VersionMap::new();
        map.record(&Key::from("a"), &Key::from("a@1"));
        assert_eq!(map.resolve(&Key::from("a")), Key::from("a@1"));
        map.record(&Key::from("a"), &Key::from("a@2"));
        assert_eq!(map.resolve(&Key::from("a")), Key::from("a@2"));
        assert_eq!(
            map.aliases(&Key::from("a")),
            &[Key::from("a@1"), Key::from("a@2")]
        );
    }

    #[test]
    fn test_identity_records_nothing() {
        let mut map = VersionMap::new();
        map.record(&Key::from("a"), &Key::from("a"));
        assert_eq!(map.resolve(&Key::from("a")), Key::from("a"));
        assert!(!map.is_replacement(&Key::from("a")));
    }

    #[test]
    fn test_replacements_are_tracked() {
        let mut map = VersionMap::new();
        map.record(&Key::from("a"), &Key::from("a@1"));
        assert!(map.is_replacement(&Key::from("a@1")));
        assert!(!map.is_replacement(&Key::from("a")));
    }
}
