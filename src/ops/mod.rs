//! Trie traversals: lookup, insertion, removal and whole-subtree rewrites.

pub mod copy;
pub mod get;
pub mod insert;
pub mod remove;

use safe_bump::Idx;

use crate::node::{BitmapNode, OwnerId};
use crate::store::MapStore;

/// Returns a node `owner` may write: `idx` itself if already owned,
/// otherwise a fresh copy sharing every child.
pub fn own_node<K, V, S: MapStore<K, V>>(
    store: &mut S,
    idx: Idx<BitmapNode<K, V>>,
    owner: OwnerId,
) -> Idx<BitmapNode<K, V>> {
    let node = store.get_node(idx);
    if node.owner == owner {
        return idx;
    }
    let copy = node.copy_for(owner);
    store.alloc_node(copy)
}
