//! Leaf chains: singly linked entries sharing one trie slot or table bucket.
//!
//! All walks are iterative; persistent edits collect the path to the touched
//! leaf and rebuild it back to front, so a chain of any length is handled
//! without recursion.

use safe_bump::Idx;

use crate::node::{Leaf, OwnerId};
use crate::provider::HashProvider;
use crate::store::MapStore;

/// Optional link to the next leaf in a chain.
pub type Link<K, V> = Option<Idx<Leaf<K, V>>>;

/// Outcome of a single scan for a key.
pub enum Locate<K, V> {
    /// The key lives at this leaf.
    Found(Idx<Leaf<K, V>>),
    /// The key is absent; a new leaf belongs after `tail`.
    Vacant {
        /// Last leaf of the chain, `None` for an empty chain.
        tail: Link<K, V>,
    },
}

/// Outcome of an in-place unlink.
pub enum ChainRemove<K, V> {
    /// Key was not found; the chain is unchanged.
    NotFound,
    /// Key was unlinked.
    Removed {
        /// Head of the remaining chain, `None` if it is now empty.
        head: Link<K, V>,
    },
}

fn matches<K, V, P: HashProvider<K>>(provider: &P, leaf: &Leaf<K, V>, key: &K, hash: u32) -> bool {
    leaf.hash == hash && provider.equals(&leaf.key, key)
}

fn collect<K, V, S: MapStore<K, V>>(store: &S, head: Link<K, V>) -> Vec<Idx<Leaf<K, V>>> {
    let mut path = Vec::new();
    let mut cur = head;
    while let Some(idx) = cur {
        path.push(idx);
        cur = store.get_leaf(idx).next;
    }
    path
}

fn copy_leaf<K, V, S>(store: &mut S, idx: Idx<Leaf<K, V>>, owner: OwnerId, next: Link<K, V>) -> Idx<Leaf<K, V>>
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
{
    let leaf = store.get_leaf(idx);
    let mut copy = Leaf::new(owner, leaf.key.clone(), leaf.value.clone(), leaf.hash);
    copy.next = next;
    store.alloc_leaf(copy)
}

/// Points the leaves of `path` (head first) back onto `tail`.
///
/// Leaves already linked to the right successor are kept as-is; owned ones
/// are relinked in place and foreign ones are copied for `owner`.
fn relink<K, V, S>(
    store: &mut S,
    path: &[Idx<Leaf<K, V>>],
    mut tail: Link<K, V>,
    owner: OwnerId,
) -> Link<K, V>
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
{
    for &idx in path.iter().rev() {
        let (owned, next) = {
            let leaf = store.get_leaf(idx);
            (leaf.owner == owner, leaf.next)
        };
        tail = Some(if next == tail {
            idx
        } else if owned {
            store.get_leaf_mut(idx).next = tail;
            idx
        } else {
            copy_leaf(store, idx, owner, tail)
        });
    }
    tail
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Scans the chain once for `key`, remembering the tail when absent.
pub fn locate<K, V, S, P>(store: &S, provider: &P, head: Link<K, V>, key: &K, hash: u32) -> Locate<K, V>
where
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let mut tail = None;
    let mut cur = head;
    while let Some(idx) = cur {
        let leaf = store.get_leaf(idx);
        if matches(provider, leaf, key, hash) {
            return Locate::Found(idx);
        }
        tail = Some(idx);
        cur = leaf.next;
    }
    Locate::Vacant { tail }
}

/// Returns the leaf holding `key`, if any.
pub fn find<K, V, S, P>(store: &S, provider: &P, head: Link<K, V>, key: &K, hash: u32) -> Link<K, V>
where
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    match locate(store, provider, head, key, hash) {
        Locate::Found(idx) => Some(idx),
        Locate::Vacant { .. } => None,
    }
}

// ---------------------------------------------------------------------------
// In-place edits (caller owns the whole chain)
// ---------------------------------------------------------------------------

/// Allocates `leaf` and links it after `tail`.
pub fn append<K, V, S: MapStore<K, V>>(store: &mut S, tail: Link<K, V>, leaf: Leaf<K, V>) -> Idx<Leaf<K, V>> {
    let idx = store.alloc_leaf(leaf);
    if let Some(tail) = tail {
        store.get_leaf_mut(tail).next = Some(idx);
    }
    idx
}

/// Returns the leaf for `key`, appending one built by `make` if absent.
///
/// The flag is `true` when a leaf was created.
pub fn get_or_insert_with<K, V, S, P, F>(
    store: &mut S,
    provider: &P,
    head: Idx<Leaf<K, V>>,
    key: K,
    hash: u32,
    owner: OwnerId,
    make: F,
) -> (Idx<Leaf<K, V>>, bool)
where
    S: MapStore<K, V>,
    P: HashProvider<K>,
    F: FnOnce(&K) -> V,
{
    match locate(store, provider, Some(head), &key, hash) {
        Locate::Found(idx) => (idx, false),
        Locate::Vacant { tail } => {
            let value = make(&key);
            (append(store, tail, Leaf::new(owner, key, value, hash)), true)
        }
    }
}

/// Unlinks the leaf holding `key`.
pub fn remove<K, V, S, P>(store: &mut S, provider: &P, head: Idx<Leaf<K, V>>, key: &K, hash: u32) -> ChainRemove<K, V>
where
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let mut prev: Link<K, V> = None;
    let mut cur = Some(head);
    while let Some(idx) = cur {
        let (hit, next) = {
            let leaf = store.get_leaf(idx);
            (matches(provider, leaf, key, hash), leaf.next)
        };
        if hit {
            return match prev {
                None => ChainRemove::Removed { head: next },
                Some(prev) => {
                    store.get_leaf_mut(prev).next = next;
                    ChainRemove::Removed { head: Some(head) }
                }
            };
        }
        prev = cur;
        cur = next;
    }
    ChainRemove::NotFound
}

// ---------------------------------------------------------------------------
// Owner-checked edits
// ---------------------------------------------------------------------------

/// Associates `key` with `value`, copying every leaf on the path that
/// `owner` does not own. Returns the new head and the replaced value, if any.
#[allow(clippy::too_many_arguments)]
pub fn assoc<K, V, S, P>(
    store: &mut S,
    provider: &P,
    head: Link<K, V>,
    key: K,
    hash: u32,
    value: V,
    owner: OwnerId,
) -> (Idx<Leaf<K, V>>, Option<V>)
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let mut path = Vec::new();
    let mut cur = head;
    while let Some(idx) = cur {
        let (hit, next, leaf_owner) = {
            let leaf = store.get_leaf(idx);
            (matches(provider, leaf, &key, hash), leaf.next, leaf.owner)
        };
        if hit {
            let (replaced, old) = if leaf_owner == owner {
                let old = store.get_leaf_mut(idx).set_value(value);
                (idx, old)
            } else {
                let old = store.get_leaf(idx).value.clone();
                let mut copy = Leaf::new(owner, key, value, hash);
                copy.next = next;
                (store.alloc_leaf(copy), old)
            };
            let head = relink(store, &path, Some(replaced), owner).unwrap_or(replaced);
            return (head, Some(old));
        }
        path.push(idx);
        cur = next;
    }
    let fresh = store.alloc_leaf(Leaf::new(owner, key, value, hash));
    (relink(store, &path, Some(fresh), owner).unwrap_or(fresh), None)
}

/// Removes `key`, copying the leaves before it that `owner` does not own.
///
/// Returns `None` if the key is absent, otherwise the new head (`None` when
/// the chain is now empty).
pub fn dissoc<K, V, S, P>(
    store: &mut S,
    provider: &P,
    head: Idx<Leaf<K, V>>,
    key: &K,
    hash: u32,
    owner: OwnerId,
) -> Option<Link<K, V>>
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
    P: HashProvider<K>,
{
    let mut path = Vec::new();
    let mut cur = Some(head);
    while let Some(idx) = cur {
        let (hit, next) = {
            let leaf = store.get_leaf(idx);
            (matches(provider, leaf, key, hash), leaf.next)
        };
        if hit {
            return Some(relink(store, &path, next, owner));
        }
        path.push(idx);
        cur = next;
    }
    None
}

/// Copies the whole chain for `owner`, preserving order.
pub fn clone_chain<K, V, S>(store: &mut S, head: Idx<Leaf<K, V>>, owner: OwnerId) -> Idx<Leaf<K, V>>
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
{
    let path = collect(store, Some(head));
    let mut tail = None;
    for &idx in path.iter().rev() {
        tail = Some(copy_leaf(store, idx, owner, tail));
    }
    tail.unwrap_or(head)
}

/// Replaces every value with `f(key, value)`, in chain order.
///
/// Owned leaves are rewritten in place, foreign ones copied.
pub fn update_values<K, V, S, F>(store: &mut S, head: Idx<Leaf<K, V>>, owner: OwnerId, f: &mut F) -> Idx<Leaf<K, V>>
where
    K: Clone,
    S: MapStore<K, V>,
    F: FnMut(&K, &V) -> V,
{
    let path = collect(store, Some(head));
    let values: Vec<V> = path
        .iter()
        .map(|&idx| {
            let leaf = store.get_leaf(idx);
            f(&leaf.key, &leaf.value)
        })
        .collect();

    let mut tail = None;
    for (&idx, value) in path.iter().zip(values).rev() {
        let owned = store.get_leaf(idx).owner == owner;
        tail = Some(if owned {
            let leaf = store.get_leaf_mut(idx);
            leaf.value = value;
            leaf.next = tail;
            idx
        } else {
            let leaf = store.get_leaf(idx);
            let mut copy = Leaf::new(owner, leaf.key.clone(), value, leaf.hash);
            copy.next = tail;
            store.alloc_leaf(copy)
        });
    }
    tail.unwrap_or(head)
}

/// Partitions the chain on `hash & bit` into `(clear, set)` chains,
/// preserving relative order.
///
/// Owned leaves are relinked, foreign leaves copied unless their link is
/// already correct.
pub fn split<K, V, S>(store: &mut S, head: Idx<Leaf<K, V>>, bit: usize, owner: OwnerId) -> (Link<K, V>, Link<K, V>)
where
    K: Clone,
    V: Clone,
    S: MapStore<K, V>,
{
    let path = collect(store, Some(head));
    let mut lo = None;
    let mut hi = None;
    for &idx in path.iter().rev() {
        let (high, owned, next) = {
            let leaf = store.get_leaf(idx);
            (leaf.hash as usize & bit != 0, leaf.owner == owner, leaf.next)
        };
        let target = if high { &mut hi } else { &mut lo };
        let tail = *target;
        *target = Some(if next == tail {
            idx
        } else if owned {
            store.get_leaf_mut(idx).next = tail;
            idx
        } else {
            copy_leaf(store, idx, owner, tail)
        });
    }
    (lo, hi)
}
