//! Leaf iterators for [`BitmapTrie`](crate::BitmapTrie) and
//! [`HashTable`](crate::HashTable).
//!
//! Both are explicit-state cursors over the store: single-pass and not
//! restartable.

use safe_bump::Idx;

use crate::node::{BitmapNode, Leaf, Slot};
use crate::store::MapStore;

/// Depth-first pre-order iterator over the leaves of a trie.
///
/// Yields the null-key leaf first, then each slot in bitmap order, then
/// every leaf of a chain before moving on.
pub struct TrieIter<'a, K, V, S> {
    store: &'a S,
    null_leaf: Option<Idx<Leaf<K, V>>>,
    stack: Vec<(Idx<BitmapNode<K, V>>, usize)>,
    chain: Option<Idx<Leaf<K, V>>>,
    remaining: usize,
}

impl<'a, K, V, S> TrieIter<'a, K, V, S> {
    pub(crate) fn new(
        store: &'a S,
        root: Idx<BitmapNode<K, V>>,
        null_leaf: Option<Idx<Leaf<K, V>>>,
        len: usize,
    ) -> Self {
        Self {
            store,
            null_leaf,
            stack: vec![(root, 0)],
            chain: None,
            remaining: len,
        }
    }
}

impl<'a, K: 'a, V: 'a, S: MapStore<K, V>> Iterator for TrieIter<'a, K, V, S> {
    type Item = &'a Leaf<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(idx) = self.null_leaf.take() {
            self.remaining = self.remaining.saturating_sub(1);
            return Some(self.store.get_leaf(idx));
        }
        loop {
            if let Some(idx) = self.chain {
                let leaf = self.store.get_leaf(idx);
                self.chain = leaf.next;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(leaf);
            }
            let (node_idx, pos) = *self.stack.last()?;
            let node = self.store.get_node(node_idx);
            if pos >= node.len() {
                self.stack.pop();
                continue;
            }
            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }
            match node.child(pos) {
                Slot::Branch(child) => self.stack.push((child, 0)),
                Slot::Chain(head) => self.chain = Some(head),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a, S: MapStore<K, V>> ExactSizeIterator for TrieIter<'a, K, V, S> {}

/// Iterator over the leaves of a hash table, bucket by bucket.
pub struct TableIter<'a, K, V, S> {
    store: &'a S,
    buckets: &'a [Option<Idx<Leaf<K, V>>>],
    pos: usize,
    chain: Option<Idx<Leaf<K, V>>>,
    remaining: usize,
}

impl<'a, K, V, S> TableIter<'a, K, V, S> {
    pub(crate) const fn new(store: &'a S, buckets: &'a [Option<Idx<Leaf<K, V>>>], len: usize) -> Self {
        Self {
            store,
            buckets,
            pos: 0,
            chain: None,
            remaining: len,
        }
    }
}

impl<'a, K, V, S: MapStore<K, V>> Iterator for TableIter<'a, K, V, S> {
    type Item = &'a Leaf<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(idx) = self.chain {
                let leaf = self.store.get_leaf(idx);
                self.chain = leaf.next;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(leaf);
            }
            let bucket = self.buckets.get(self.pos)?;
            self.pos += 1;
            self.chain = *bucket;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S: MapStore<K, V>> ExactSizeIterator for TableIter<'_, K, V, S> {}
