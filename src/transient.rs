//! In-place editing sessions.
//!
//! A [`Transient`] pairs an exclusively owned container with its store. The
//! edits below skip every ownership check and write nodes and leaves in
//! place, which is only sound because opening the session guarantees nothing
//! else can reach them.

use safe_bump::Idx;

use crate::chain::{self, ChainRemove, Locate};
use crate::node::Leaf;
use crate::ops::insert::get_or_create;
use crate::ops::remove::{Removal, remove_in_place};
use crate::provider::HashProvider;
use crate::reduce::Lookup;
use crate::store::MapStore;
use crate::table::HashTable;
use crate::trie::BitmapTrie;

/// Exclusive in-place editing session over a container and its store.
///
/// Created by [`BitmapTrie::transient`] or [`HashTable::transient`].
pub struct Transient<'a, M, S> {
    map: &'a mut M,
    store: &'a mut S,
}

impl<'a, M, S> Transient<'a, M, S> {
    pub(crate) const fn new(map: &'a mut M, store: &'a mut S) -> Self {
        Self { map, store }
    }

    /// Returns the container being edited.
    #[must_use]
    pub const fn map(&self) -> &M {
        &*self.map
    }

    /// Returns the value for `key`, if any.
    #[must_use]
    pub fn get<'s, K: 's, V>(&'s self, key: &K) -> Option<&'s V>
    where
        M: Lookup<K, V>,
        S: MapStore<K, V>,
    {
        self.map.get(&*self.store, key)
    }
}

// ---------------------------------------------------------------------------
// Trie session
// ---------------------------------------------------------------------------

impl<K, V, P, S> Transient<'_, BitmapTrie<K, V, P>, S>
where
    K: Clone,
    V: Clone,
    P: HashProvider<K> + Clone,
    S: MapStore<K, V>,
{
    /// Returns the leaf for `key`, creating it with `make` if absent.
    pub fn get_or_create_with<F: FnOnce(&K) -> V>(&mut self, key: K, make: F) -> &mut Leaf<K, V> {
        let trie = &mut *self.map;
        let store = &mut *self.store;
        let idx = if trie.provider.is_null(&key) {
            if let Some(idx) = trie.null_leaf {
                idx
            } else {
                let value = make(&key);
                let idx = store.alloc_leaf(Leaf::new(trie.owner, key, value, 0));
                trie.null_leaf = Some(idx);
                trie.count += 1;
                idx
            }
        } else {
            let hash = trie.provider.hash(&key);
            let created = get_or_create(store, &trie.provider, trie.owner, trie.root, hash, key, make);
            if created.added {
                trie.count += 1;
            }
            created.leaf
        };
        store.get_leaf_mut(idx)
    }

    /// Returns the leaf for `key`, creating it with a default value if absent.
    pub fn get_or_create(&mut self, key: K) -> &mut Leaf<K, V>
    where
        V: Default,
    {
        self.get_or_create_with(key, |_| V::default())
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut pending = Some(value);
        let leaf = self.get_or_create_with(key, |_| pending.take().expect("pending value is taken once"));
        pending.map(|value| leaf.set_value(value))
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let trie = &mut *self.map;
        if trie.provider.is_null(key) {
            if trie.null_leaf.take().is_none() {
                return false;
            }
            trie.count -= 1;
            return true;
        }
        let hash = trie.provider.hash(key);
        match remove_in_place(&mut *self.store, &trie.provider, trie.root, hash, key, false) {
            Removal::NotFound => false,
            Removal::Removed { .. } => {
                trie.count -= 1;
                true
            }
        }
    }

    /// Replaces the entry for `key` with `f(key, current)`; a `None` result
    /// removes it. Returns the value now stored.
    pub fn compute<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, Option<&V>) -> Option<V>,
    {
        match self.map.find(&*self.store, &key) {
            Some(idx) => self.replace_or_remove(idx, &key, |k, v| f(k, Some(v))),
            None => {
                let value = f(&key, None)?;
                Some(self.get_or_create_with(key, |_| value).value())
            }
        }
    }

    /// Returns the value for `key`, storing `f(key)` first if absent.
    pub fn compute_if_absent<F: FnOnce(&K) -> V>(&mut self, key: K, f: F) -> &V {
        self.get_or_create_with(key, f).value()
    }

    /// Replaces the value for a present `key` with `f(key, value)`; a `None`
    /// result removes it. Absent keys are left alone.
    pub fn compute_if_present<F>(&mut self, key: &K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, &V) -> Option<V>,
    {
        let idx = self.map.find(&*self.store, key)?;
        self.replace_or_remove(idx, key, f)
    }

    fn replace_or_remove<F>(&mut self, idx: Idx<Leaf<K, V>>, key: &K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, &V) -> Option<V>,
    {
        let Some(value) = f(key, self.store.get_leaf(idx).value()) else {
            self.remove(key);
            return None;
        };
        let leaf = self.store.get_leaf_mut(idx);
        leaf.value = value;
        Some(&leaf.value)
    }
}

// ---------------------------------------------------------------------------
// Table session
// ---------------------------------------------------------------------------

impl<K, V, P, S> Transient<'_, HashTable<K, V, P>, S>
where
    K: Clone,
    V: Clone,
    P: HashProvider<K> + Clone,
    S: MapStore<K, V>,
{
    /// Links a new leaf after `tail` in `bucket` and grows the table if the
    /// threshold is reached.
    fn insert_at(&mut self, bucket: usize, tail: chain::Link<K, V>, leaf: Leaf<K, V>) -> Idx<Leaf<K, V>> {
        let table = &mut *self.map;
        let store = &mut *self.store;
        let idx = chain::append(store, tail, leaf);
        if tail.is_none() {
            table.buckets[bucket] = Some(idx);
        }
        table.count += 1;
        table.check_resize(store);
        idx
    }

    /// Returns the leaf for `key`, creating it with `make` if absent.
    ///
    /// One chain scan finds either the key or the insertion point.
    pub fn get_or_create_with<F: FnOnce(&K) -> V>(&mut self, key: K, make: F) -> &mut Leaf<K, V> {
        let hash = self.map.provider.hash(&key);
        let bucket = self.map.bucket_index(hash);
        let head = self.map.buckets[bucket];
        let idx = match chain::locate(&*self.store, &self.map.provider, head, &key, hash) {
            Locate::Found(idx) => idx,
            Locate::Vacant { tail } => {
                let value = make(&key);
                let owner = self.map.owner;
                self.insert_at(bucket, tail, Leaf::new(owner, key, value, hash))
            }
        };
        self.store.get_leaf_mut(idx)
    }

    /// Returns the leaf for `key`, creating it with a default value if absent.
    pub fn get_or_create(&mut self, key: K) -> &mut Leaf<K, V>
    where
        V: Default,
    {
        self.get_or_create_with(key, |_| V::default())
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut pending = Some(value);
        let leaf = self.get_or_create_with(key, |_| pending.take().expect("pending value is taken once"));
        pending.map(|value| leaf.set_value(value))
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let table = &mut *self.map;
        let hash = table.provider.hash(key);
        let bucket = table.bucket_index(hash);
        let Some(head) = table.buckets[bucket] else {
            return false;
        };
        match chain::remove(&mut *self.store, &table.provider, head, key, hash) {
            ChainRemove::NotFound => false,
            ChainRemove::Removed { head } => {
                table.buckets[bucket] = head;
                table.count -= 1;
                true
            }
        }
    }

    /// Replaces the entry for `key` with `f(key, current)`; a `None` result
    /// removes it. Returns the value now stored.
    ///
    /// One chain scan serves both the update and the insert path.
    pub fn compute<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, Option<&V>) -> Option<V>,
    {
        let hash = self.map.provider.hash(&key);
        let bucket = self.map.bucket_index(hash);
        let head = self.map.buckets[bucket];
        match chain::locate(&*self.store, &self.map.provider, head, &key, hash) {
            Locate::Found(idx) => self.replace_or_remove(idx, &key, |k, v| f(k, Some(v))),
            Locate::Vacant { tail } => {
                let value = f(&key, None)?;
                let owner = self.map.owner;
                let idx = self.insert_at(bucket, tail, Leaf::new(owner, key, value, hash));
                Some(self.store.get_leaf(idx).value())
            }
        }
    }

    /// Returns the value for `key`, storing `f(key)` first if absent.
    pub fn compute_if_absent<F: FnOnce(&K) -> V>(&mut self, key: K, f: F) -> &V {
        self.get_or_create_with(key, f).value()
    }

    /// Replaces the value for a present `key` with `f(key, value)`; a `None`
    /// result removes it. Absent keys are left alone.
    pub fn compute_if_present<F>(&mut self, key: &K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, &V) -> Option<V>,
    {
        let hash = self.map.provider.hash(key);
        let head = self.map.buckets[self.map.bucket_index(hash)];
        let idx = chain::find(&*self.store, &self.map.provider, head, key, hash)?;
        self.replace_or_remove(idx, key, f)
    }

    fn replace_or_remove<F>(&mut self, idx: Idx<Leaf<K, V>>, key: &K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, &V) -> Option<V>,
    {
        let Some(value) = f(key, self.store.get_leaf(idx).value()) else {
            self.remove(key);
            return None;
        };
        let leaf = self.store.get_leaf_mut(idx);
        leaf.value = value;
        Some(&leaf.value)
    }
}
