use super::ConstantProvider;
use crate::node::Slot;
use crate::store::MapStore;
use crate::{BitmapTrie, HashTable, Lookup, MapArena};

/// Two keys with the same hash share one chain.
#[test]
fn two_colliding_keys() {
    let mut arena = MapArena::new();
    let mut trie = BitmapTrie::with_provider(&mut arena, ConstantProvider);
    trie.put(&mut arena, 1_u32, "first");
    trie.put(&mut arena, 2_u32, "second");

    assert_eq!(trie.len(), 2);
    assert_eq!(trie.get(&arena, &1), Some(&"first"));
    assert_eq!(trie.get(&arena, &2), Some(&"second"));
}

/// A constant hash yields one deep chain in a single root slot, not a tower
/// of branches.
#[test]
fn constant_hash_builds_one_chain() {
    let mut arena = MapArena::new();
    let mut trie = BitmapTrie::with_provider(&mut arena, ConstantProvider);
    for i in 0_u32..50 {
        trie.put(&mut arena, i, i * 2);
    }
    assert_eq!(trie.len(), 50);

    let root = arena.get_node(trie.root());
    assert_eq!(root.len(), 1);
    let Some(Slot::Chain(head)) = root.slot(0) else {
        panic!("expected a chain, got {:?}", root.slot(0));
    };
    let (_, nodes) = arena.arena_len();
    assert_eq!(nodes, 1, "no branch may be allocated for equal hashes");

    let mut chain_len = 0;
    let mut cur = Some(head);
    while let Some(idx) = cur {
        chain_len += 1;
        cur = arena.get_leaf(idx).next;
    }
    assert_eq!(chain_len, 50);

    for i in 0_u32..50 {
        assert_eq!(trie.get(&arena, &i), Some(&(i * 2)), "missing key {i}");
    }
}

/// Chain entries keep insertion order.
#[test]
fn chain_iterates_in_insertion_order() {
    let mut arena = MapArena::new();
    let mut trie = BitmapTrie::with_provider(&mut arena, ConstantProvider);
    for key in [5_u32, 3, 9, 1] {
        trie.put(&mut arena, key, ());
    }
    let keys: Vec<u32> = trie.iter(&arena).map(|leaf| *leaf.key()).collect();
    assert_eq!(keys, vec![5, 3, 9, 1]);
}

#[test]
fn remove_from_chain() {
    let mut arena = MapArena::new();
    let mut trie = BitmapTrie::with_provider(&mut arena, ConstantProvider);
    trie.put(&mut arena, 1_u32, 10);
    trie.put(&mut arena, 2_u32, 20);
    trie.put(&mut arena, 3_u32, 30);

    assert!(trie.remove(&mut arena, &2));
    assert_eq!(trie.len(), 2);
    assert_eq!(trie.get(&arena, &1), Some(&10));
    assert_eq!(trie.get(&arena, &2), None);
    assert_eq!(trie.get(&arena, &3), Some(&30));

    // Head removal.
    assert!(trie.remove(&mut arena, &1));
    assert_eq!(trie.get(&arena, &3), Some(&30));

    // Last entry empties the slot.
    assert!(trie.remove(&mut arena, &3));
    assert!(trie.is_empty());
    assert_eq!(arena.get_node(trie.root()).len(), 0);
}

#[test]
fn overwrite_in_chain() {
    let mut arena = MapArena::new();
    let mut trie = BitmapTrie::with_provider(&mut arena, ConstantProvider);
    trie.put(&mut arena, 1_u32, 10);
    trie.put(&mut arena, 2_u32, 20);

    assert_eq!(trie.put(&mut arena, 2, 99), Some(20));
    assert_eq!(trie.len(), 2);
    assert_eq!(trie.get(&arena, &2), Some(&99));
}

/// Persistent edits inside a shared chain copy only the leaves before the
/// touched one.
#[test]
fn persistent_edit_in_shared_chain() {
    let mut arena = MapArena::new();
    let mut base = BitmapTrie::with_provider(&mut arena, ConstantProvider);
    for i in 0_u32..5 {
        base.mut_assoc(&mut arena, i, i);
    }

    let (leaves_before, _) = arena.arena_len();
    let edited = base.assoc(&mut arena, 2, 200);
    let (leaves_after, _) = arena.arena_len();
    // Leaves 0, 1 and 2 are copied; 3 and 4 stay shared.
    assert_eq!(leaves_after - leaves_before, 3);

    assert_eq!(base.get(&arena, &2), Some(&2));
    assert_eq!(edited.get(&arena, &2), Some(&200));
    for i in [0_u32, 1, 3, 4] {
        assert_eq!(edited.get(&arena, &i), Some(&i));
    }

    let mut edited = edited;
    let trimmed = edited.dissoc(&mut arena, &0);
    assert_eq!(trimmed.len(), 4);
    assert_eq!(trimmed.get(&arena, &0), None);
    assert_eq!(edited.get(&arena, &0), Some(&0));
}

#[test]
fn table_with_constant_hash() {
    let mut arena = MapArena::new();
    let mut table = HashTable::with_provider(&mut arena, ConstantProvider);
    for i in 0_u32..40 {
        table.put(&mut arena, i, i + 1);
    }
    assert_eq!(table.len(), 40);
    for i in 0_u32..40 {
        assert_eq!(table.get(&arena, &i), Some(&(i + 1)));
    }
    for i in (0_u32..40).step_by(2) {
        assert!(table.remove(&mut arena, &i));
    }
    assert_eq!(table.len(), 20);
    for i in 0_u32..40 {
        assert_eq!(table.contains_key(&arena, &i), i % 2 == 1, "key {i}");
    }
}
