//! Insertion: in-place get-or-create and owner-checked COW assoc.

use safe_bump::Idx;
use tracing::trace;

use crate::chain;
use crate::node::{self, BitmapNode, Leaf, OwnerId, Slot};
use crate::ops::own_node;
use crate::provider::HashProvider;
use crate::store::MapStore;

/// Outcome of an in-place get-or-create.
pub struct Created<K, V> {
    /// Leaf holding the key.
    pub leaf: Idx<Leaf<K, V>>,
    /// `true` if the leaf was created by this call.
    pub added: bool,
}

/// Outcome of a recursive assoc.
pub struct AssocOutcome<K, V> {
    /// Root of the modified subtree, owned by the acting owner.
    pub node: Idx<BitmapNode<K, V>>,
    /// Value the key held before, `None` if the key was inserted.
    pub replaced: Option<V>,
}

/// Returns the leaf for `key` below `node_idx`, creating it with `make` if
/// absent. Mutates every node on the path in place.
///
/// A chain slot whose hash differs from `hash` is pushed one level down into
/// a fresh branch before insertion continues there.
#[allow(clippy::too_many_arguments)]
pub fn get_or_create<K, V, S, P, F>(
    store: &mut S,
    provider: &P,
    owner: OwnerId,
    mut node_idx: Idx<BitmapNode<K, V>>,
    hash: u32,
    key: K,
    make: F,
) -> Created<K, V>
where
    S: MapStore<K, V>,
    P: HashProvider<K>,
    F: FnOnce(&K) -> V,
{
    loop {
        let (shift, bitmap) = {
            let node = store.get_node(node_idx);
            (node.shift, node.bitmap)
        };
        let bit = node::mask(node::fragment(hash, shift));
        let pos = node::index(bitmap, bit);

        if bitmap & bit == 0 {
            let value = make(&key);
            let leaf = store.alloc_leaf(Leaf::new(owner, key, value, hash));
            store
                .get_node_mut(node_idx)
                .insert_child(pos, bit, Slot::Chain(leaf));
            return Created { leaf, added: true };
        }

        match store.get_node(node_idx).child(pos) {
            Slot::Branch(child) => node_idx = child,
            Slot::Chain(head) => {
                let head_hash = store.get_leaf(head).hash;
                if head_hash == hash {
                    let (leaf, added) =
                        chain::get_or_insert_with(store, provider, head, key, hash, owner, make);
                    return Created { leaf, added };
                }
                let next_shift = shift + node::BITS_PER_LEVEL;
                let branch = store.alloc_node(BitmapNode::seeded(
                    owner,
                    next_shift,
                    head_hash,
                    Slot::Chain(head),
                ));
                store.get_node_mut(node_idx).children[pos] = Some(Slot::Branch(branch));
                trace!(shift = next_shift, "split chain slot into branch");
                node_idx = branch;
            }
        }
    }
}

/// Associates `key` with `value` below `node_idx`, copying every node and
/// leaf on the path that `owner` does not own.
#[allow(clippy::too_many_arguments)]
pub fn assoc_recursive<K, V, S, P>(
    store: &mut S,
    provider: &P,
    owner: OwnerId,
    node_idx: Idx<BitmapNode<K, V>>,
    hash: u32,
    key: K,
    value: V,
) -> AssocOutcome<K, V>
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let node_idx = own_node(store, node_idx, owner);
    let (shift, bitmap) = {
        let node = store.get_node(node_idx);
        (node.shift, node.bitmap)
    };
    let bit = node::mask(node::fragment(hash, shift));
    let pos = node::index(bitmap, bit);

    if bitmap & bit == 0 {
        let leaf = store.alloc_leaf(Leaf::new(owner, key, value, hash));
        store
            .get_node_mut(node_idx)
            .insert_child(pos, bit, Slot::Chain(leaf));
        return AssocOutcome {
            node: node_idx,
            replaced: None,
        };
    }

    let (slot, replaced) = match store.get_node(node_idx).child(pos) {
        Slot::Branch(child) => {
            let outcome = assoc_recursive(store, provider, owner, child, hash, key, value);
            (Slot::Branch(outcome.node), outcome.replaced)
        }
        Slot::Chain(head) => {
            let head_hash = store.get_leaf(head).hash;
            if head_hash == hash {
                let (head, replaced) =
                    chain::assoc(store, provider, Some(head), key, hash, value, owner);
                (Slot::Chain(head), replaced)
            } else {
                let next_shift = shift + node::BITS_PER_LEVEL;
                let branch = store.alloc_node(BitmapNode::seeded(
                    owner,
                    next_shift,
                    head_hash,
                    Slot::Chain(head),
                ));
                trace!(shift = next_shift, "split chain slot into branch");
                let outcome = assoc_recursive(store, provider, owner, branch, hash, key, value);
                (Slot::Branch(outcome.node), outcome.replaced)
            }
        }
    };
    store.get_node_mut(node_idx).children[pos] = Some(slot);
    AssocOutcome {
        node: node_idx,
        replaced,
    }
}
