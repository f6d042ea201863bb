//! Lookup operation: descends the trie to the chain that may hold a key.

use safe_bump::Idx;

use crate::chain;
use crate::node::{self, BitmapNode, Leaf, Slot};
use crate::provider::HashProvider;
use crate::store::MapStore;

/// Searches for `key` in the subtree rooted at `node_idx`.
///
/// Returns the index of the leaf holding it, if found.
pub fn find_leaf<K, V, S, P>(
    store: &S,
    provider: &P,
    node_idx: Idx<BitmapNode<K, V>>,
    hash: u32,
    key: &K,
) -> Option<Idx<Leaf<K, V>>>
where
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let node = store.get_node(node_idx);
    let bit = node::mask(node::fragment(hash, node.shift));
    if node.bitmap & bit == 0 {
        return None;
    }
    match node.child(node::index(node.bitmap, bit)) {
        Slot::Branch(child) => find_leaf(store, provider, child, hash, key),
        Slot::Chain(head) => {
            // Every leaf in a trie chain shares one hash.
            if store.get_leaf(head).hash != hash {
                return None;
            }
            chain::find(store, provider, Some(head), key, hash)
        }
    }
}
