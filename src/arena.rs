//! Arena-backed storage (single-threaded).

use safe_bump::{Arena, Idx};

use crate::node::{BitmapNode, Leaf, OwnerId};
use crate::store::MapStore;

/// Storage backend using two [`Arena`]s plus an owner id counter.
///
/// Leaves and nodes are never freed; entries made unreachable by
/// copy-on-write stay allocated until the arena is dropped.
pub struct MapArena<K, V> {
    leaves: Arena<Leaf<K, V>>,
    nodes: Arena<BitmapNode<K, V>>,
    next_owner: u32,
}

impl<K, V> MapArena<K, V> {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            leaves: Arena::new(),
            nodes: Arena::new(),
            next_owner: 0,
        }
    }
}

impl<K, V> Default for MapArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MapStore<K, V> for MapArena<K, V> {
    fn alloc_leaf(&mut self, leaf: Leaf<K, V>) -> Idx<Leaf<K, V>> {
        self.leaves.alloc(leaf)
    }

    fn get_leaf(&self, idx: Idx<Leaf<K, V>>) -> &Leaf<K, V> {
        self.leaves.get(idx)
    }

    fn get_leaf_mut(&mut self, idx: Idx<Leaf<K, V>>) -> &mut Leaf<K, V> {
        self.leaves.get_mut(idx)
    }

    fn alloc_node(&mut self, node: BitmapNode<K, V>) -> Idx<BitmapNode<K, V>> {
        self.nodes.alloc(node)
    }

    fn get_node(&self, idx: Idx<BitmapNode<K, V>>) -> &BitmapNode<K, V> {
        self.nodes.get(idx)
    }

    fn get_node_mut(&mut self, idx: Idx<BitmapNode<K, V>>) -> &mut BitmapNode<K, V> {
        self.nodes.get_mut(idx)
    }

    fn fresh_owner(&mut self) -> OwnerId {
        let id = OwnerId::new(self.next_owner);
        self.next_owner = self
            .next_owner
            .checked_add(1)
            .expect("owner id space exhausted");
        id
    }

    fn arena_len(&self) -> (usize, usize) {
        (self.leaves.len(), self.nodes.len())
    }
}

impl<K, V> std::fmt::Debug for MapArena<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapArena")
            .field("leaves", &self.leaves.len())
            .field("nodes", &self.nodes.len())
            .field("owners", &self.next_owner)
            .finish()
    }
}
