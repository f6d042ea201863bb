//! Bitmap hash trie: a HAMT map with an out-of-band null key.

use std::fmt;

use safe_bump::Idx;
use tracing::debug;

use crate::iter::TrieIter;
use crate::node::{BitmapNode, Leaf, OwnerId};
use crate::ops::copy::{clone_subtree, update_subtree};
use crate::ops::get::find_leaf;
use crate::ops::insert::assoc_recursive;
use crate::ops::remove::{DissocOutcome, dissoc_recursive};
use crate::provider::{DefaultProvider, HashProvider};
use crate::reduce::{Lookup, Reducible};
use crate::store::MapStore;
use crate::transient::Transient;

/// Hash array mapped trie over a shared [`MapStore`].
///
/// The trie is a handle: a root node, an optional null-key leaf and an entry
/// count. Nodes live in the store and may be shared with other tries created
/// from this one by [`assoc`](Self::assoc), [`dissoc`](Self::dissoc) or
/// [`shallow_clone`](Self::shallow_clone).
pub struct BitmapTrie<K, V, P = DefaultProvider> {
    pub(crate) owner: OwnerId,
    pub(crate) root: Idx<BitmapNode<K, V>>,
    pub(crate) null_leaf: Option<Idx<Leaf<K, V>>>,
    pub(crate) count: usize,
    pub(crate) provider: P,
    pub(crate) exclusive: bool,
}

// ---------------------------------------------------------------------------
// Construction & accessors (no trait bounds)
// ---------------------------------------------------------------------------

impl<K, V, P> BitmapTrie<K, V, P> {
    /// Creates an empty trie with a default provider.
    #[must_use]
    pub fn new<S: MapStore<K, V>>(store: &mut S) -> Self
    where
        P: Default,
    {
        Self::with_provider(store, P::default())
    }

    /// Creates an empty trie using `provider` for key identity.
    #[must_use]
    pub fn with_provider<S: MapStore<K, V>>(store: &mut S, provider: P) -> Self {
        let owner = store.fresh_owner();
        let root = store.alloc_node(BitmapNode::new(owner, 0));
        Self {
            owner,
            root,
            null_leaf: None,
            count: 0,
            provider,
            exclusive: true,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the trie contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the owner id this trie mutates under.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns `true` if no other container can reach this trie's nodes.
    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// Returns the root node index.
    #[must_use]
    pub const fn root(&self) -> Idx<BitmapNode<K, V>> {
        self.root
    }

    /// Returns an iterator over the leaves.
    #[must_use]
    pub fn iter<'s, S: MapStore<K, V>>(&self, store: &'s S) -> TrieIter<'s, K, V, S> {
        TrieIter::new(store, self.root, self.null_leaf, self.count)
    }
}

// ---------------------------------------------------------------------------
// Sharing, copying and owner-checked writes
// ---------------------------------------------------------------------------

impl<K: Clone, V: Clone, P: HashProvider<K> + Clone> BitmapTrie<K, V, P> {
    /// Returns a trie sharing every node with `self`.
    ///
    /// Both tries move to fresh owners, so neither can mutate the shared
    /// nodes in place; the first write on either side copies its path.
    pub fn shallow_clone<S: MapStore<K, V>>(&mut self, store: &mut S) -> Self {
        self.owner = store.fresh_owner();
        self.exclusive = false;
        Self {
            owner: store.fresh_owner(),
            root: self.root,
            null_leaf: self.null_leaf,
            count: self.count,
            provider: self.provider.clone(),
            exclusive: false,
        }
    }

    /// Returns an exclusive copy of every node and leaf under a fresh owner.
    #[must_use]
    pub fn deep_clone<S: MapStore<K, V>>(&self, store: &mut S) -> Self {
        let owner = store.fresh_owner();
        let root = clone_subtree(store, self.root, owner);
        let null_leaf = self.null_leaf.map(|idx| {
            let leaf = store.get_leaf(idx);
            let copy = Leaf::new(owner, leaf.key.clone(), leaf.value.clone(), leaf.hash);
            store.alloc_leaf(copy)
        });
        debug!(entries = self.count, "deep-cloned bitmap trie");
        Self {
            owner,
            root,
            null_leaf,
            count: self.count,
            provider: self.provider.clone(),
            exclusive: true,
        }
    }

    /// Associates `key` with `value`, mutating nodes this trie owns and
    /// copying the rest. Returns `true` if the key was new.
    pub fn mut_assoc<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> bool {
        self.assoc_owned(store, key, value).is_none()
    }

    /// Owner-checked assoc returning the value `key` held before.
    fn assoc_owned<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> Option<V> {
        if self.provider.is_null(&key) {
            let (idx, old) = match self.null_leaf {
                Some(idx) if store.get_leaf(idx).owner == self.owner => {
                    (idx, Some(store.get_leaf_mut(idx).set_value(value)))
                }
                Some(idx) => {
                    let old = store.get_leaf(idx).value.clone();
                    (store.alloc_leaf(Leaf::new(self.owner, key, value, 0)), Some(old))
                }
                None => {
                    self.count += 1;
                    (store.alloc_leaf(Leaf::new(self.owner, key, value, 0)), None)
                }
            };
            self.null_leaf = Some(idx);
            return old;
        }

        let hash = self.provider.hash(&key);
        let outcome = assoc_recursive(store, &self.provider, self.owner, self.root, hash, key, value);
        self.root = outcome.node;
        if outcome.replaced.is_none() {
            self.count += 1;
        }
        outcome.replaced
    }

    /// Removes `key`, mutating nodes this trie owns and copying the rest.
    /// Returns `true` if the key was present.
    pub fn mut_dissoc<S: MapStore<K, V>>(&mut self, store: &mut S, key: &K) -> bool {
        if self.provider.is_null(key) {
            if self.null_leaf.take().is_none() {
                return false;
            }
            self.count -= 1;
            return true;
        }

        let hash = self.provider.hash(key);
        match dissoc_recursive(store, &self.provider, self.owner, self.root, hash, key, false) {
            DissocOutcome::NotFound => false,
            DissocOutcome::Removed { node } => {
                if let Some(root) = node {
                    self.root = root;
                }
                self.count -= 1;
                true
            }
        }
    }

    /// Returns a new trie with `key` associated with `value`; `self` keeps
    /// its contents.
    #[must_use]
    pub fn assoc<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> Self {
        let mut next = self.shallow_clone(store);
        next.mut_assoc(store, key, value);
        next
    }

    /// Returns a new trie without `key`; `self` keeps its contents.
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
        if let Some(idx) = self.null_leaf {
            let (owned, value) = {
                let leaf = store.get_leaf(idx);
                (leaf.owner == self.owner, f(&leaf.key, &leaf.value))
            };
            self.null_leaf = Some(if owned {
                store.get_leaf_mut(idx).value = value;
                idx
            } else {
                let key = store.get_leaf(idx).key.clone();
                store.alloc_leaf(Leaf::new(self.owner, key, value, 0))
            });
        }
        self.root = update_subtree(store, self.root, self.owner, &mut f);
    }

    /// Opens an in-place editing session.
    ///
    /// A trie that shares structure is first replaced by a deep clone of
    /// itself, so the session only ever touches nodes nothing else can see.
    pub fn transient<'a, S: MapStore<K, V>>(&'a mut self, store: &'a mut S) -> Transient<'a, Self, S> {
        if !self.exclusive {
            debug!(entries = self.count, "promoting shared bitmap trie for in-place edits");
            *self = self.deep_clone(store);
        }
        Transient::new(self, store)
    }

    /// Inserts or replaces `key`, returning the previous value.
    ///
    /// A shared trie path-copies like [`mut_assoc`](Self::mut_assoc) and
    /// stays shared.
    pub fn put<S: MapStore<K, V>>(&mut self, store: &mut S, key: K, value: V) -> Option<V> {
        if self.exclusive {
            self.transient(store).put(key, value)
        } else {
            self.assoc_owned(store, key, value)
        }
    }

    /// Removes `key`. Returns `true` if it was present.
    ///
    /// A shared trie path-copies like [`mut_dissoc`](Self::mut_dissoc).
    pub fn remove<S: MapStore<K, V>>(&mut self, store: &mut S, key: &K) -> bool {
        if self.exclusive {
            self.transient(store).remove(key)
        } else {
            self.mut_dissoc(store, key)
        }
    }
}

// ---------------------------------------------------------------------------
// Reduce protocol
// ---------------------------------------------------------------------------

impl<K, V, P: HashProvider<K>> Reducible<K, V> for BitmapTrie<K, V, P> {
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

impl<K, V, P: HashProvider<K>> BitmapTrie<K, V, P> {
    pub(crate) fn find<S: MapStore<K, V>>(&self, store: &S, key: &K) -> Option<Idx<Leaf<K, V>>> {
        if self.provider.is_null(key) {
            return self.null_leaf;
        }
        find_leaf(store, &self.provider, self.root, self.provider.hash(key), key)
    }
}

impl<K, V, P: HashProvider<K>> Lookup<K, V> for BitmapTrie<K, V, P> {
    fn get_node<'s, S>(&self, store: &'s S, key: &K) -> Option<&'s Leaf<K, V>>
    where
        S: MapStore<K, V>,
    {
        self.find(store, key).map(|idx| store.get_leaf(idx))
    }
}

impl<K, V, P> fmt::Debug for BitmapTrie<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapTrie")
            .field("owner", &self.owner.raw())
            .field("count", &self.count)
            .field("exclusive", &self.exclusive)
            .finish_non_exhaustive()
    }
}
