//! Property tests: the store invariants hold under arbitrary edit sequences

use grove::{BreadthFirst, Key, SharedStore, Tree, Vertex, VertexStore};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Op {
    /// Hang a fresh leaf under the vertex at this reachable-set index
    AddLeaf(usize, u8),
    /// Unlink the nth child of the vertex at this index
    EraseChild(usize, usize),
    /// Rewrite the payload of the vertex at this index
    ReplacePayload(usize, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), any::<u8>()).prop_map(|(i, p)| Op::AddLeaf(i, p)),
        (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::EraseChild(i, j)),
        (any::<usize>(), any::<u8>()).prop_map(|(i, p)| Op::ReplacePayload(i, p)),
    ]
}

/// Keys reachable from the root, breadth-first
fn reachable(store: &SharedStore<String>, root: &Key) -> Vec<Key> {
    let vertices = store.read();
    BreadthFirst::new(&vertices, root)
        .map(|vertex| vertex.key().clone())
        .collect()
}

fn apply(tree: &mut Tree<String>, next_leaf: &mut u64, op: &Op) {
    let keys = reachable(tree.vertices(), tree.root());
    match op {
        Op::AddLeaf(index, payload) => {
            let parent = keys[index % keys.len()].clone();
            *next_leaf += 1;
            let leaf = Vertex::new(format!("leaf{next_leaf}"), payload.to_string());
            tree.insert_child_vertex(&parent, leaf).unwrap();
        }
        Op::EraseChild(index, child_index) => {
            let parent = keys[index % keys.len()].clone();
            let children = {
                let vertices = tree.vertices().read();
                vertices.get(&parent).unwrap().children().clone()
            };
            if children.is_empty() {
                return;
            }
            let child = children.get(child_index % children.len()).unwrap().clone();
            tree.erase_child(&parent, &child).unwrap();
        }
        Op::ReplacePayload(index, payload) => {
            let source = keys[index % keys.len()].clone();
            tree.replace_payload(&source, payload.to_string()).unwrap();
        }
    }
}

/// Reference counts equal child-list occurrences plus the root pin
fn check_refcounts(
    store: &SharedStore<String>,
    root: &Key,
) -> Result<(), proptest::test_runner::TestCaseError> {
    let vertices = store.read();
    let mut expected: BTreeMap<Key, usize> = BTreeMap::new();
    for vertex in vertices.iter() {
        for child in vertex.live_children() {
            *expected.entry(child.clone()).or_default() += 1;
        }
    }
    *expected.entry(root.clone()).or_default() += 1;
    for vertex in vertices.iter() {
        let key = vertex.key();
        let count = expected.get(key).copied().unwrap_or(0);
        prop_assert_eq!(vertices.ref_count(key), count, "refcount mismatch for {}", key);
    }
    prop_assert_eq!(vertices.edge_count(), expected.values().sum::<usize>());
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_under_random_edits(ops in prop::collection::vec(op_strategy(), 1..32)) {
        let store = VertexStore::<String>::new().into_shared();
        let mut tree = Tree::new(Arc::clone(&store)).unwrap();
        let mut next_leaf = 0u64;

        for op in &ops {
            apply(&mut tree, &mut next_leaf, op);

            // refcount integrity
            check_refcounts(&store, tree.root())?;

            let vertices = store.read();
            // no dangling reachability
            for vertex in vertices.iter() {
                for child in vertex.live_children() {
                    prop_assert!(vertices.contains(child), "dangling child {}", child);
                }
            }
            drop(vertices);

            // garbage freedom: everything stored is reachable from the root
            let reached = reachable(&store, tree.root());
            prop_assert_eq!(reached.len(), store.read().len());
        }
    }
}
