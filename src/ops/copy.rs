//! Whole-subtree rewrites: deep copy and value mapping.

use safe_bump::Idx;

use crate::chain;
use crate::node::{BitmapNode, OwnerId, Slot};
use crate::ops::own_node;
use crate::store::MapStore;

/// Copies every node and leaf below `node_idx` for `owner`.
pub fn clone_subtree<K, V, S>(
    store: &mut S,
    node_idx: Idx<BitmapNode<K, V>>,
    owner: OwnerId,
) -> Idx<BitmapNode<K, V>>
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
{
    let mut copy = store.get_node(node_idx).copy_for(owner);
    for slot in copy.children.iter_mut().flatten() {
        *slot = match *slot {
            Slot::Branch(child) => Slot::Branch(clone_subtree(store, child, owner)),
            Slot::Chain(head) => Slot::Chain(chain::clone_chain(store, head, owner)),
        };
    }
    store.alloc_node(copy)
}

/// Replaces every value below `node_idx` with `f(key, value)`, in
/// iteration order. Nodes and leaves `owner` does not own are copied.
pub fn update_subtree<K, V, S, F>(
    store: &mut S,
    node_idx: Idx<BitmapNode<K, V>>,
    owner: OwnerId,
    f: &mut F,
) -> Idx<BitmapNode<K, V>>
where
    K: Clone,
    S: MapStore<K, V>,
    F: FnMut(&K, &V) -> V,
{
    let node_idx = own_node(store, node_idx, owner);
    let len = store.get_node(node_idx).len();
    for pos in 0..len {
        let slot = match store.get_node(node_idx).child(pos) {
            Slot::Branch(child) => Slot::Branch(update_subtree(store, child, owner, f)),
            Slot::Chain(head) => Slot::Chain(chain::update_values(store, head, owner, f)),
        };
        store.get_node_mut(node_idx).children[pos] = Some(slot);
    }
    node_idx
}
