//! Reduce/iterate protocol shared by every container.
//!
//! A container only supplies its leaves in iteration order; folding, the
//! structural hash, the string form and keyed reads are all derived here.

use std::fmt;
use std::ops::ControlFlow;

use crate::error::MapError;
use crate::hash::{HashValue, UnorderedHash};
use crate::node::Leaf;
use crate::provider::HashProvider;
use crate::store::MapStore;

/// Left fold over the leaves of a container.
pub trait Reducible<K, V> {
    /// Hash provider fixing key identity and fold short-circuit.
    type Provider: HashProvider<K>;

    /// Returns the container's provider.
    fn provider(&self) -> &Self::Provider;

    /// Returns the number of entries.
    fn size(&self) -> usize;

    /// Returns a single-pass iterator over the leaves, in container order.
    fn leaves<'s, S>(&'s self, store: &'s S) -> impl Iterator<Item = &'s Leaf<K, V>> + 's
    where
        S: MapStore<K, V> + 's,
        K: 's,
        V: 's;

    /// Folds `combine` over the leaves starting from `seed`.
    ///
    /// `combine` returns [`ControlFlow::Break`] to stop early; the provider's
    /// `is_reduced` is checked after every element and the final accumulator
    /// is passed through `unreduce`.
    fn reduce<'s, S, A, F>(&'s self, store: &'s S, seed: A, mut combine: F) -> A
    where
        S: MapStore<K, V> + 's,
        K: 's,
        V: 's,
        F: FnMut(A, &'s Leaf<K, V>) -> ControlFlow<A, A>,
    {
        let provider = self.provider();
        let mut acc = ControlFlow::Continue(seed);
        for leaf in self.leaves(store) {
            acc = combine(provider.unreduce(acc), leaf);
            if provider.is_reduced(&acc) {
                break;
            }
        }
        provider.unreduce(acc)
    }

    /// Calls `f` on every entry.
    fn for_each<'s, S, F>(&'s self, store: &'s S, mut f: F)
    where
        S: MapStore<K, V> + 's,
        K: 's,
        V: 's,
        F: FnMut(&'s K, &'s V),
    {
        self.reduce(store, (), |(), leaf| {
            f(leaf.key(), leaf.value());
            ControlFlow::Continue(())
        });
    }

    /// Returns an iterator over the keys.
    fn keys<'s, S>(&'s self, store: &'s S) -> impl Iterator<Item = &'s K> + 's
    where
        S: MapStore<K, V> + 's,
        K: 's,
        V: 's,
    {
        self.leaves(store).map(Leaf::key)
    }

    /// Returns an iterator over the values.
    fn values<'s, S>(&'s self, store: &'s S) -> impl Iterator<Item = &'s V> + 's
    where
        S: MapStore<K, V> + 's,
        K: 's,
        V: 's,
    {
        self.leaves(store).map(Leaf::value)
    }

    /// Order-independent structural hash: the unordered hash of every
    /// leaf's `[key, value]` hash.
    fn hash_code<'s, S>(&'s self, store: &'s S) -> u32
    where
        S: MapStore<K, V> + 's,
        K: 's,
        V: HashValue + 's,
    {
        self.reduce(store, UnorderedHash::new(), |mut acc, leaf| {
            acc.accept(leaf.hash_code());
            ControlFlow::Continue(acc)
        })
        .finish()
    }

    /// Renders the entries as `{k v, k v}` using their `Debug` forms.
    fn render<'s, S>(&'s self, store: &'s S) -> String
    where
        S: MapStore<K, V> + 's,
        K: fmt::Debug + 's,
        V: fmt::Debug + 's,
    {
        let parts = self.reduce(store, Vec::with_capacity(self.size()), |mut parts, leaf| {
            parts.push(format!("{:?} {:?}", leaf.key(), leaf.value()));
            ControlFlow::Continue(parts)
        });
        format!("{{{}}}", parts.join(", "))
    }
}

/// Keyed reads over a [`Reducible`] container.
pub trait Lookup<K, V>: Reducible<K, V> {
    /// Returns the leaf holding `key`, if any.
    fn get_node<'s, S>(&self, store: &'s S, key: &K) -> Option<&'s Leaf<K, V>>
    where
        S: MapStore<K, V>;

    /// Returns the value for `key`, if any.
    fn get<'s, S>(&self, store: &'s S, key: &K) -> Option<&'s V>
    where
        S: MapStore<K, V>,
        K: 's,
    {
        self.get_node(store, key).map(Leaf::value)
    }

    /// Returns `true` if `key` is present.
    fn contains_key<S>(&self, store: &S, key: &K) -> bool
    where
        S: MapStore<K, V>,
    {
        self.get_node(store, key).is_some()
    }

    /// Returns the value for `key`, or `default` when absent.
    fn get_or_default<'s, S>(&self, store: &'s S, key: &K, default: &'s V) -> &'s V
    where
        S: MapStore<K, V>,
        K: 's,
    {
        self.get(store, key).unwrap_or(default)
    }

    /// Calls the map as a function of `key` plus `rest`.
    ///
    /// With no extra argument this is [`get`](Self::get); with one, it is
    /// [`get_or_default`](Self::get_or_default).
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidInvocation`] for any other arity.
    fn invoke<'s, S>(&self, store: &'s S, key: &K, rest: &[&'s V]) -> Result<Option<&'s V>, MapError>
    where
        S: MapStore<K, V>,
        K: 's,
    {
        match rest {
            [] => Ok(self.get(store, key)),
            [default] => Ok(Some(self.get_or_default(store, key, *default))),
            _ => Err(MapError::InvalidInvocation {
                arity: rest.len() + 1,
            }),
        }
    }
}
