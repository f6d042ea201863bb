//! Open hash table: power-of-two buckets of leaf chains.

use std::fmt;

use safe_bump::Idx;
use tracing::debug;

use crate::chain;
use crate::error::MapError;
use crate::iter::TableIter;
use crate::node::{Leaf, OwnerId};
use crate::provider::{DefaultProvider, HashProvider};
use crate::reduce::{Lookup, Reducible};
use crate::store::MapStore;
use crate::transient::Transient;

/// Bucket count of a table built with default options.
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor of a table built with default options.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Construction options for a [`HashTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    /// Initial bucket count, rounded up to a power of two.
    pub initial_capacity: usize,
    /// Fill ratio at which the bucket array doubles.
    pub load_factor: f32,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

/// Hash table whose buckets are leaf chains in a shared [`MapStore`].
///
/// The bucket array belongs to the handle; leaves live in the store and may
/// be shared with tables created from this one. Capacity only grows.
pub struct HashTable<K, V, P = DefaultProvider> {
    pub(crate) owner: OwnerId,
    pub(crate) buckets: Vec<Option<Idx<Leaf<K, V>>>>,
    pub(crate) count: usize,
    pub(crate) provider: P,
    pub(crate) exclusive: bool,
    capacity: usize,
    mask: usize,
    threshold: usize,
    load_factor: f32,
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    (capacity as f64 * f64::from(load_factor)).floor() as usize
}

// ---------------------------------------------------------------------------
// Construction & accessors (no trait bounds)
// ---------------------------------------------------------------------------

impl<K, V, P> HashTable<K, V, P> {
    /// Creates an empty table with a default provider and default options.
    #[must_use]
    pub fn new<S: MapStore<K, V>>(store: &mut S) -> Self
    where
        P: Default,
    {
        Self::with_provider(store, P::default())
    }

    /// Creates an empty table with default options.
    #[must_use]
    pub fn with_provider<S: MapStore<K, V>>(store: &mut S, provider: P) -> Self {
        Self::build(store, provider, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty table with explicit options.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidLoadFactor`] if the load factor is not a finite
    /// positive number. [`MapError::InvalidCapacity`] if the initial capacity
    /// is zero or rounds up past `usize::MAX`.
    pub fn with_options<S: MapStore<K, V>>(
        store: &mut S,
        provider: P,
        options: TableOptions,
    ) -> Result<Self, MapError> {
        let lf = options.load_factor;
        if !lf.is_finite() || lf <= 0.0 {
            return Err(MapError::InvalidLoadFactor(lf));
        }
        let capacity = match options.initial_capacity {
            0 => None,
            n => n.checked_next_power_of_two(),
        };
        let Some(capacity) = capacity else {
            return Err(MapError::InvalidCapacity(options.initial_capacity));
        };
        Ok(Self::build(store, provider, capacity, lf))
    }

    /// `capacity` must be a power of two.
    fn build<S: MapStore<K, V>>(store: &mut S, provider: P, capacity: usize, load_factor: f32) -> Self {
        Self {
            owner: store.fresh_owner(),
            buckets: vec![None; capacity],
            count: 0,
            provider,
            exclusive: true,
            capacity,
            mask: capacity - 1,
            threshold: threshold_for(capacity, load_factor),
            load_factor,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the table contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the bucket count (always a power of two).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the entry count that triggers the next doubling.
    #[must_use]
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the configured load factor.
    #[must_use]
    pub const fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the owner id this table mutates under.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns `true` if no other container can reach this table's leaves.
    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Returns an iterator over the leaves, bucket by bucket.
    #[must_use]
    pub fn iter<'s, S: MapStore<K, V>>(&'s self, store: &'s S) -> TableIter<'s, K, V, S> {
        TableIter::new(store, &self.buckets, self.count)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn bucket_index(&self, hash: u32) -> usize {
        hash as usize & self.mask
    }
}

// ---------------------------------------------------------------------------
// Sharing, copying and owner-checked writes
// ---------------------------------------------------------------------------

impl<K: Clone, V: Clone, P: HashProvider<K> + Clone> HashTable<K, V, P> {
    /// Returns a table sharing every chain with `self`; only the bucket
    /// array is copied.
    ///
    /// Both tables move to fresh owners, so chains are copied on first write.
    pub fn shallow_clone<S: MapStore<K, V>>(&mut self, store: &mut S) -> Self {
        self.owner = store.fresh_owner();
        self.exclusive = false;
        Self {
            owner: store.fresh_owner(),
            buckets: self.buckets.clone(),
            count: self.count,
            provider: self.provider.clone(),
            exclusive: false,
            capacity: self.capacity,
            mask: self.mask,
            threshold: self.threshold,
            load_factor: self.load_factor,
        }
    }

    /// Returns an exclusive copy of every chain under a fresh owner.
    #[must_use]
    pub fn deep_clone<S: MapStore<K, V>>(&self, store: &mut S) -> Self {
        let owner = store.fresh_owner();
        let buckets = self
            .buckets
            .iter()
            .map(|head| head.map(|head| chain::clone_chain(store, head, owner)))
            .collect();
        debug!(entries = self.count, capacity = self.capacity, "deep-cloned hash table");
        Self {
            owner,
            buckets,
            count: self.count,
            provider: self.provider.clone(),
            exclusive: true,
            capacity: self.capacity,
            mask: self.mask,
            threshold: self.threshold,
            load_factor: self.load_factor,
        }
    }

    /// Associates `key` with `value`, mutating leaves this table owns and
    /// copying the rest. Returns `true` if the key was new.
    pub fn mut_assoc<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> bool {
        self.assoc_owned(store, key, value).is_none()
    }

    /// Owner-checked assoc returning the value `key` held before.
    fn assoc_owned<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> Option<V> {
        let hash = self.provider.hash(&key);
        let bucket = self.bucket_index(hash);
        let (head, replaced) = chain::assoc(
            store,
            &self.provider,
            self.buckets[bucket],
            key,
            hash,
            value,
            self.owner,
        );
        self.buckets[bucket] = Some(head);
        if replaced.is_none() {
            self.count += 1;
            self.check_resize(store);
        }
        replaced
    }

    /// Removes `key`, mutating leaves this table owns and copying the rest.
    /// Returns `true` if the key was present.
    pub fn mut_dissoc<S: MapStore<K, V>>(&mut self, store: &mut S, key: &K) -> bool {
        let hash = self.provider.hash(key);
        let bucket = self.bucket_index(hash);
        let Some(head) = self.buckets[bucket] else {
            return false;
        };
        match chain::dissoc(store, &self.provider, head, key, hash, self.owner) {
            None => false,
            Some(head) => {
                self.buckets[bucket] = head;
                self.count -= 1;
                true
            }
        }
    }

    /// Returns a new table with `key` associated with `value`; `self` keeps
    /// its contents.
    #[must_use]
    pub fn assoc<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> Self {
        let mut next = self.shallow_clone(store);
        next.mut_assoc(store, key, value);
        next
    }

    /// Returns a new table without `key`; `self` keeps its contents.
    #[must_use]
    pub fn dissoc<S: MapStore<K, V>>(&mut self, store: &mut S, key: &K) -> Self {
        let mut next = self.shallow_clone(store);
        next.mut_dissoc(store, key);
        next
    }

    /// Replaces every value with `f(key, value)`, in iteration order.
    pub fn update_values<S, F>(&mut self, store: &mut S, mut f: F)
    where
        S: MapStore<K, V>,
        F: FnMut(&K, &V) -> V,
    {
        let owner = self.owner;
        for head in self.buckets.iter_mut().flatten() {
            *head = chain::update_values(store, *head, owner, &mut f);
        }
    }

    /// Doubles the bucket array once the entry count reaches the threshold.
    ///
    /// Each chain is split on the single new index bit, so no hash is
    /// recomputed.
    pub(crate) fn check_resize<S: MapStore<K, V>>(&mut self, store: &mut S) {
        if self.count < self.threshold {
            return;
        }
        let old_capacity = self.capacity;
        let capacity = old_capacity * 2;
        let mut buckets = vec![None; capacity];
        for (i, head) in self.buckets.iter().enumerate() {
            if let Some(head) = *head {
                let (lo, hi) = chain::split(store, head, old_capacity, self.owner);
                buckets[i] = lo;
                buckets[i + old_capacity] = hi;
            }
        }
        self.buckets = buckets;
        self.capacity = capacity;
        self.mask = capacity - 1;
        self.threshold = threshold_for(capacity, self.load_factor);
        debug!(from = old_capacity, to = capacity, entries = self.count, "grew hash table");
    }

    /// Opens an in-place editing session.
    ///
    /// A table that shares leaves is first replaced by a deep clone of
    /// itself, so the session only ever touches leaves nothing else can see.
    pub fn transient<'a, S: MapStore<K, V>>(&'a mut self, store: &'a mut S) -> Transient<'a, Self, S> {
        if !self.exclusive {
            debug!(entries = self.count, "promoting shared hash table for in-place edits");
            *self = self.deep_clone(store);
        }
        Transient::new(self, store)
    }

    /// Inserts or replaces `key`, returning the previous value.
    ///
    /// A shared table copies only the touched chain and stays shared.
    pub fn put<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> Option<V> {
        if self.exclusive {
            self.transient(store).put(key, value)
        } else {
            self.assoc_owned(store, key, value)
        }
    }

    /// Removes `key`. Returns `true` if it was present.
    ///
    /// A shared table copies only the touched chain.
    pub fn remove<S: MapStore<K, V>>(&mut self, store: &mut S, key: &K) -> bool {
        if self.exclusive {
            self.transient(store).remove(key)
        } else {
            self.mut_dissoc(store, key)
        }
    }

    /// Groups `items` by `key_fn`, folding each group into an accumulator
    /// started by `init` and advanced by `step`.
    ///
    /// A finishing pass over the groups is an [`update_values`](Self::update_values)
    /// call on the result.
    pub fn group_by_reduce<S, T, I, KF, IF, RF>(
        store: &mut S,
        provider: P,
        items: I,
        mut key_fn: KF,
        mut init: IF,
        mut step: RF,
    ) -> Self
    where
        S: MapStore<K, V>,
        I: IntoIterator<Item = T>,
        KF: FnMut(&T) -> K,
        IF: FnMut(&K) -> V,
        RF: FnMut(&mut V, T),
    {
        let mut table = Self::with_provider(store, provider);
        {
            let mut session = table.transient(store);
            for item in items {
                let key = key_fn(&item);
                let leaf = session.get_or_create_with(key, &mut init);
                step(leaf.value_mut(), item);
            }
        }
        table
    }
}

// ---------------------------------------------------------------------------
// Reduce protocol
// ---------------------------------------------------------------------------

impl<K, V, P: HashProvider<K>> Reducible<K, V> for HashTable<K, V, P> {
    type Provider = P;

    fn provider(&self) -> &P {
        &self.provider
    }

    fn size(&self) -> usize {
        self.count
    }

    fn leaves<'s, S>(&'s self, store: &'s S) -> impl Iterator<Item = &'s Leaf<K, V>> + 's
    where
        S: MapStore<K, V> + 's,
        K: 's,
        V: 's,
    {
        self.iter(store)
    }
}

impl<K, V, P: HashProvider<K>> Lookup<K, V> for HashTable<K, V, P> {
    fn get_node<'s, S>(&self, store: &'s S, key: &K) -> Option<&'s Leaf<K, V>>
    where
        S: MapStore<K, V>,
    {
        let hash = self.provider.hash(key);
        let head = self.buckets[self.bucket_index(hash)];
        chain::find(store, &self.provider, head, key, hash).map(|idx| store.get_leaf(idx))
    }
}

impl<K, V, P> fmt::Debug for HashTable<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("owner", &self.owner.raw())
            .field("count", &self.count)
            .field("capacity", &self.capacity)
            .field("load_factor", &self.load_factor)
            .field("exclusive", &self.exclusive)
            .finish_non_exhaustive()
    }
}
