//! Removal: in-place unlink and owner-checked COW dissoc.

use safe_bump::Idx;

use crate::chain::{self, ChainRemove};
use crate::node::{self, BitmapNode, OwnerId, Slot};
use crate::ops::own_node;
use crate::provider::HashProvider;
use crate::store::MapStore;

/// Outcome of an in-place remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Key was not found; the tree is unchanged.
    NotFound,
    /// Key was removed.
    Removed {
        /// `true` if the node emptied and the parent must drop its slot.
        emptied: bool,
    },
}

/// Outcome of a recursive dissoc.
pub enum DissocOutcome<K, V> {
    /// Key was not found; the tree is unchanged.
    NotFound,
    /// Key was removed.
    Removed {
        /// New root of the modified subtree, or `None` if the parent must
        /// drop its slot.
        node: Option<Idx<BitmapNode<K, V>>>,
    },
}

/// Removes `key` below `node_idx`, mutating nodes and leaves in place.
///
/// With `collapse`, a node left without children reports itself emptied.
pub fn remove_in_place<K, V, S, P>(
    store: &mut S,
    provider: &P,
    node_idx: Idx<BitmapNode<K, V>>,
    hash: u32,
    key: &K,
    collapse: bool,
) -> Removal
where
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let (shift, bitmap) = {
        let node = store.get_node(node_idx);
        (node.shift, node.bitmap)
    };
    let bit = node::mask(node::fragment(hash, shift));
    if bitmap & bit == 0 {
        return Removal::NotFound;
    }
    let pos = node::index(bitmap, bit);

    let drop_slot = match store.get_node(node_idx).child(pos) {
        Slot::Branch(child) => match remove_in_place(store, provider, child, hash, key, true) {
            Removal::NotFound => return Removal::NotFound,
            Removal::Removed { emptied } => emptied,
        },
        Slot::Chain(head) => match chain::remove(store, provider, head, key, hash) {
            ChainRemove::NotFound => return Removal::NotFound,
            ChainRemove::Removed { head: Some(head) } => {
                store.get_node_mut(node_idx).children[pos] = Some(Slot::Chain(head));
                false
            }
            ChainRemove::Removed { head: None } => true,
        },
    };

    if !drop_slot {
        return Removal::Removed { emptied: false };
    }
    let node = store.get_node_mut(node_idx);
    node.remove_child(pos, bit, false);
    Removal::Removed {
        emptied: collapse && node.is_empty(),
    }
}

/// Removes `key` below `node_idx`, copying every node and leaf on the path
/// that `owner` does not own. Nothing is copied when the key is absent.
pub fn dissoc_recursive<K, V, S, P>(
    store: &mut S,
    provider: &P,
    owner: OwnerId,
    node_idx: Idx<BitmapNode<K, V>>,
    hash: u32,
    key: &K,
    collapse: bool,
) -> DissocOutcome<K, V>
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let (shift, bitmap) = {
        let node = store.get_node(node_idx);
        (node.shift, node.bitmap)
    };
    let bit = node::mask(node::fragment(hash, shift));
    if bitmap & bit == 0 {
        return DissocOutcome::NotFound;
    }
    let pos = node::index(bitmap, bit);

    let replacement = match store.get_node(node_idx).child(pos) {
        Slot::Branch(child) => {
            match dissoc_recursive(store, provider, owner, child, hash, key, true) {
                DissocOutcome::NotFound => return DissocOutcome::NotFound,
                DissocOutcome::Removed { node } => node.map(Slot::Branch),
            }
        }
        Slot::Chain(head) => match chain::dissoc(store, provider, head, key, hash, owner) {
            None => return DissocOutcome::NotFound,
            Some(head) => head.map(Slot::Chain),
        },
    };

    let node_idx = own_node(store, node_idx, owner);
    let node = store.get_node_mut(node_idx);
    if let Some(slot) = replacement {
        node.children[pos] = Some(slot);
        return DissocOutcome::Removed {
            node: Some(node_idx),
        };
    }
    node.remove_child(pos, bit, true);
    DissocOutcome::Removed {
        node: (!collapse || !node.is_empty()).then_some(node_idx),
    }
}
