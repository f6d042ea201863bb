//! Node types shared by the trie and the hash table, plus bitmap helpers.

use std::fmt;

use safe_bump::Idx;

use crate::error::MapError;
use crate::hash::{self, HashValue};

/// Bits per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Deepest shift a branch can sit at; two distinct 32-bit hashes always
/// diverge at or above it.
pub const MAX_SHIFT: u32 = 30;

/// Smallest child array a bitmap node allocates.
pub const MIN_CHILDREN: usize = 4;

/// Identity of the container currently allowed to mutate a node in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u32);

impl OwnerId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One key/value entry, linked to the next entry sharing its slot.
///
/// The hash is fixed at construction.
pub struct Leaf<K, V> {
    pub(crate) owner: OwnerId,
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u32,
    pub(crate) next: Option<Idx<Self>>,
}

impl<K, V> Leaf<K, V> {
    pub(crate) const fn new(owner: OwnerId, key: K, value: V, hash: u32) -> Self {
        Self {
            owner,
            key,
            value,
            hash,
            next: None,
        }
    }

    /// Returns the key.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value.
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Returns the value for in-place update.
    pub const fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replaces the value, returning the previous one.
    pub const fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Returns the provider hash of the key.
    #[must_use]
    pub const fn hash(&self) -> u32 {
        self.hash
    }

    /// Returns the owner this leaf was created or last copied for.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// A leaf reads as the pair `[key, value]`.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn len(&self) -> usize {
        2
    }

    /// Always `false`; present for symmetry with [`len`](Self::len).
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns element `idx` of the pair `[key, value]`.
    ///
    /// # Errors
    ///
    /// [`MapError::IndexOutOfRange`] for any index other than 0 or 1.
    pub const fn nth(&self, idx: usize) -> Result<LeafItem<'_, K, V>, MapError> {
        match idx {
            0 => Ok(LeafItem::Key(&self.key)),
            1 => Ok(LeafItem::Value(&self.value)),
            _ => Err(MapError::IndexOutOfRange {
                index: idx,
                len: 2,
            }),
        }
    }

    /// Returns element `idx` of the pair, or `default` when out of range.
    #[must_use]
    pub fn nth_or<'a>(&'a self, idx: usize, default: LeafItem<'a, K, V>) -> LeafItem<'a, K, V> {
        self.nth(idx).unwrap_or(default)
    }

    /// Ordered hash of the pair `[key, value]`.
    #[must_use]
    pub fn hash_code(&self) -> u32
    where
        V: HashValue,
    {
        hash::hash_ordered([self.hash, self.value.hash_value()])
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Leaf<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("owner", &self.owner.0)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("hash", &format_args!("{:#010x}", self.hash))
            .finish_non_exhaustive()
    }
}

/// Element of a leaf viewed as `[key, value]`.
#[derive(Debug, PartialEq, Eq)]
pub enum LeafItem<'a, K, V> {
    /// Position 0.
    Key(&'a K),
    /// Position 1.
    Value(&'a V),
}

// LeafItem holds only references, so it is Copy for any K and V.
impl<K, V> Clone for LeafItem<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for LeafItem<'_, K, V> {}

/// Occupant of one bitmap node position.
pub enum Slot<K, V> {
    /// A deeper bitmap node.
    Branch(Idx<BitmapNode<K, V>>),
    /// Head of a leaf chain whose leaves all share one full hash.
    Chain(Idx<Leaf<K, V>>),
}

// Slot holds only an index, so it is Copy for any K and V.

impl<K, V> Clone for Slot<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Slot<K, V> {}

impl<K, V> fmt::Debug for Slot<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(idx) => f.debug_tuple("Branch").field(&idx.into_raw()).finish(),
            Self::Chain(idx) => f.debug_tuple("Chain").field(&idx.into_raw()).finish(),
        }
    }
}

/// One trie level: a presence bitmap and a dense child array.
///
/// Invariant: `children.len()` is a power of two `>= bitmap.count_ones()`,
/// positions below the popcount are occupied and the rest are `None`.
pub struct BitmapNode<K, V> {
    pub(crate) owner: OwnerId,
    pub(crate) shift: u32,
    pub(crate) bitmap: u32,
    pub(crate) children: Vec<Option<Slot<K, V>>>,
}

impl<K, V> BitmapNode<K, V> {
    /// Creates an empty node.
    pub(crate) fn new(owner: OwnerId, shift: u32) -> Self {
        Self {
            owner,
            shift,
            bitmap: 0,
            children: vec![None; MIN_CHILDREN],
        }
    }

    /// Creates a node holding one slot whose occupants hash to `hash`.
    pub(crate) fn seeded(owner: OwnerId, shift: u32, hash: u32, slot: Slot<K, V>) -> Self {
        let mut node = Self::new(owner, shift);
        node.bitmap = mask(fragment(hash, shift));
        node.children[0] = Some(slot);
        node
    }

    /// Copies the node for `owner`, sharing every child.
    pub(crate) fn copy_for(&self, owner: OwnerId) -> Self {
        Self {
            owner,
            shift: self.shift,
            bitmap: self.bitmap,
            children: self.children.clone(),
        }
    }

    /// Returns the owner.
    #[must_use]
    pub const fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Returns the bit shift of this level (depth × 5).
    #[must_use]
    pub const fn shift(&self) -> u32 {
        self.shift
    }

    /// Returns the presence bitmap.
    #[must_use]
    pub const fn bitmap(&self) -> u32 {
        self.bitmap
    }

    /// Returns the number of occupied positions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bitmap.count_ones() as usize
    }

    /// Returns `true` if no position is occupied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bitmap == 0
    }

    /// Returns the allocated child array length.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.children.len()
    }

    /// Returns the slot at dense position `pos`, if occupied.
    #[must_use]
    pub fn slot(&self, pos: usize) -> Option<Slot<K, V>> {
        self.children.get(pos).copied().flatten()
    }

    /// Returns the slot at `pos`, which the bitmap says is occupied.
    pub(crate) fn child(&self, pos: usize) -> Slot<K, V> {
        self.slot(pos).expect("bitmap bit set without a child")
    }

    /// Inserts `slot` at dense position `pos` and sets `bit`, growing the
    /// array to the next power of two when full.
    pub(crate) fn insert_child(&mut self, pos: usize, bit: u32, slot: Slot<K, V>) {
        let new_len = (self.bitmap | bit).count_ones() as usize;
        if new_len > self.children.len() {
            self.children.resize(next_pow2(new_len), None);
        }
        self.children[pos..new_len].rotate_right(1);
        self.children[pos] = Some(slot);
        self.bitmap |= bit;
    }

    /// Removes the slot at `pos` and clears `bit`. With `compact`, the array
    /// is also shrunk to the smallest power of two that fits.
    pub(crate) fn remove_child(&mut self, pos: usize, bit: u32, compact: bool) {
        let len = self.len();
        self.children[pos..len].rotate_left(1);
        self.children[len - 1] = None;
        self.bitmap &= !bit;
        if compact {
            self.children
                .truncate(next_pow2(self.len().max(MIN_CHILDREN)));
        }
    }
}

impl<K, V> fmt::Debug for BitmapNode<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapNode")
            .field("owner", &self.owner.0)
            .field("shift", &self.shift)
            .field("bitmap", &format_args!("{:#034b}", self.bitmap))
            .field("children", &self.children)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
#[must_use]
pub const fn fragment(hash: u32, shift: u32) -> u32 {
    debug_assert!(shift <= MAX_SHIFT);
    (hash >> shift) & 0x1F
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
#[must_use]
pub const fn mask(frag: u32) -> u32 {
    1 << frag
}

/// Returns the compact index of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
#[must_use]
pub const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

/// Returns the smallest power of two `>= n` (and at least 1).
#[inline]
#[must_use]
pub const fn next_pow2(n: usize) -> usize {
    n.next_power_of_two()
}
