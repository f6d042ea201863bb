//! Storage abstraction for trie and table operations.

use safe_bump::Idx;

use crate::node::{BitmapNode, Leaf, OwnerId};

/// Storage backend shared by every container built over it.
///
/// A map and all of its persistent descendants read and write through one
/// store; handles into it are only meaningful for that store.
pub trait MapStore<K, V> {
    /// Allocates a leaf, returning its index.
    fn alloc_leaf(&mut self, leaf: Leaf<K, V>) -> Idx<Leaf<K, V>>;

    /// Returns a reference to the leaf at `idx`.
    fn get_leaf(&self, idx: Idx<Leaf<K, V>>) -> &Leaf<K, V>;

    /// Returns a mutable reference to the leaf at `idx`.
    ///
    /// Callers only mutate leaves whose owner matches the acting container.
    fn get_leaf_mut(&mut self, idx: Idx<Leaf<K, V>>) -> &mut Leaf<K, V>;

    /// Allocates a bitmap node, returning its index.
    fn alloc_node(&mut self, node: BitmapNode<K, V>) -> Idx<BitmapNode<K, V>>;

    /// Returns a reference to the node at `idx`.
    fn get_node(&self, idx: Idx<BitmapNode<K, V>>) -> &BitmapNode<K, V>;

    /// Returns a mutable reference to the node at `idx`.
    fn get_node_mut(&mut self, idx: Idx<BitmapNode<K, V>>) -> &mut BitmapNode<K, V>;

    /// Hands out an owner id no container on this store has used yet.
    fn fresh_owner(&mut self) -> OwnerId;

    /// Returns the total number of allocated items in each arena:
    /// `(leaves, nodes)`.
    ///
    /// Includes dead copy-on-write copies.
    fn arena_len(&self) -> (usize, usize);
}
