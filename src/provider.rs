//! Hash providers: key identity and cooperative fold short-circuit.
//!
//! A provider is injected into every container and must stay fixed for the
//! container's lifetime: two keys are the same key exactly when the provider
//! says so.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::ops::ControlFlow;

use crate::hash::{self, HashValue};

/// Strategy defining key identity for a container.
pub trait HashProvider<K: ?Sized> {
    /// Returns the 32-bit hash of `key`.
    fn hash(&self, key: &K) -> u32;

    /// Returns `true` if `a` and `b` are the same key.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Returns `true` for the null key, which a trie stores out of band
    /// instead of hashing it into the tree.
    fn is_null(&self, _key: &K) -> bool {
        false
    }

    /// Returns `true` once a fold accumulator asks to stop.
    fn is_reduced<A>(&self, acc: &ControlFlow<A, A>) -> bool {
        acc.is_break()
    }

    /// Strips the reduced marker from a fold accumulator.
    fn unreduce<A>(&self, acc: ControlFlow<A, A>) -> A {
        match acc {
            ControlFlow::Continue(a) | ControlFlow::Break(a) => a,
        }
    }
}

/// Provider backed by the hashing kernel.
///
/// `None` is the null key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultProvider;

impl<K: HashValue + PartialEq + ?Sized> HashProvider<K> for DefaultProvider {
    fn hash(&self, key: &K) -> u32 {
        key.hash_value()
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }

    fn is_null(&self, key: &K) -> bool {
        key.is_null()
    }
}

/// Provider for any `Hash + Eq` key, hashing through a std [`BuildHasher`].
///
/// The 64-bit digest is folded to 32 bits and mixed.
#[derive(Debug, Clone, Default)]
pub struct HasherProvider<B = RandomState> {
    build: B,
}

impl<B> HasherProvider<B> {
    /// Creates a provider from a hasher builder.
    #[must_use]
    pub const fn new(build: B) -> Self {
        Self { build }
    }
}

impl<K: Hash + Eq + ?Sized, B: BuildHasher> HashProvider<K> for HasherProvider<B> {
    #[allow(clippy::cast_possible_truncation)]
    fn hash(&self, key: &K) -> u32 {
        let h = self.build.hash_one(key);
        hash::mix32(((h >> 32) as u32) ^ (h as u32))
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}
