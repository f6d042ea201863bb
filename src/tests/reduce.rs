use std::ops::ControlFlow;

use super::IdentityProvider;
use crate::{BitmapTrie, HashProvider, HashTable, MapArena, Reducible};

/// Provider that ignores stop requests, so every fold runs to the end.
#[derive(Debug, Clone, Copy, Default)]
struct NeverStops;

impl HashProvider<u32> for NeverStops {
    fn hash(&self, key: &u32) -> u32 {
        *key
    }

    fn equals(&self, a: &u32, b: &u32) -> bool {
        a == b
    }

    fn is_reduced<A>(&self, _acc: &ControlFlow<A, A>) -> bool {
        false
    }
}

fn filled<P: HashProvider<u32> + Clone>(arena: &mut MapArena<u32, u32>, provider: P, n: u32) -> BitmapTrie<u32, u32, P> {
    let mut trie = BitmapTrie::with_provider(arena, provider);
    for i in 0..n {
        trie.put(arena, i, i * 10);
    }
    trie
}

#[test]
fn sum_values() {
    let mut arena = MapArena::new();
    let trie = filled(&mut arena, IdentityProvider, 100);
    let sum = trie.reduce(&arena, 0_u32, |acc, leaf| ControlFlow::Continue(acc + leaf.value()));
    assert_eq!(sum, (0..100).map(|i| i * 10).sum::<u32>());
}

/// A `Break` stops the fold right after the element that produced it.
#[test]
fn early_termination() {
    let mut arena = MapArena::new();
    let trie = filled(&mut arena, IdentityProvider, 20);
    let mut visited = 0;
    let seen = trie.reduce(&arena, Vec::new(), |mut acc, leaf| {
        visited += 1;
        acc.push(*leaf.key());
        if acc.len() == 3 {
            ControlFlow::Break(acc)
        } else {
            ControlFlow::Continue(acc)
        }
    });
    assert_eq!(visited, 3);
    assert_eq!(seen, vec![0, 1, 2]);
}

#[test]
fn provider_decides_when_to_stop() {
    let mut arena = MapArena::new();
    let trie = filled(&mut arena, NeverStops, 20);
    let visited = trie.reduce(&arena, 0_usize, |n, _| ControlFlow::Break(n + 1));
    assert_eq!(visited, 20);
}

#[test]
fn render_entries() {
    let mut arena = MapArena::new();
    let mut trie = BitmapTrie::with_provider(&mut arena, IdentityProvider);
    assert_eq!(trie.render(&arena), "{}");
    trie.put(&mut arena, 2, 20);
    trie.put(&mut arena, 1, 10);
    assert_eq!(trie.render(&arena), "{1 10, 2 20}");
}

/// The structural hash depends on contents only, not on insertion order or
/// container kind.
#[test]
fn hash_code_is_structural() {
    let mut arena = MapArena::new();
    let mut forward = BitmapTrie::<u32, u32>::new(&mut arena);
    let mut backward = BitmapTrie::<u32, u32>::new(&mut arena);
    let mut table = HashTable::<u32, u32>::new(&mut arena);
    for i in 0..40 {
        forward.put(&mut arena, i, i + 1);
        backward.put(&mut arena, 39 - i, 40 - i);
        table.put(&mut arena, i, i + 1);
    }
    let h = forward.hash_code(&arena);
    assert_eq!(backward.hash_code(&arena), h);
    assert_eq!(table.hash_code(&arena), h);

    table.put(&mut arena, 0, 99);
    assert_ne!(table.hash_code(&arena), h);
}

#[test]
fn keys_values_for_each() {
    let mut arena = MapArena::new();
    let trie = filled(&mut arena, IdentityProvider, 5);
    let keys: Vec<u32> = trie.keys(&arena).copied().collect();
    let values: Vec<u32> = trie.values(&arena).copied().collect();
    assert_eq!(keys, vec![0, 1, 2, 3, 4]);
    assert_eq!(values, vec![0, 10, 20, 30, 40]);

    let mut pairs = Vec::new();
    trie.for_each(&arena, |k, v| pairs.push((*k, *v)));
    assert_eq!(pairs.len(), 5);
    assert!(pairs.iter().all(|(k, v)| *v == k * 10));
}
