use super::IdentityProvider;
use crate::provider::DefaultProvider;
use crate::store::MapStore;
use crate::{
    DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, HashTable, Lookup, MapArena, MapError, Reducible,
    TableOptions,
};

#[test]
fn defaults() {
    let mut arena = MapArena::new();
    let table: HashTable<u32, u32> = HashTable::new(&mut arena);
    assert_eq!(table.capacity(), DEFAULT_CAPACITY);
    assert_eq!(table.threshold(), 12);
    assert!((table.load_factor() - DEFAULT_LOAD_FACTOR).abs() < f32::EPSILON);
    assert!(table.is_empty());
    assert!(table.is_exclusive());
}

/// The bucket array doubles once the count reaches `capacity * load_factor`.
#[test]
fn grows_at_threshold() {
    let mut arena = MapArena::new();
    let mut table = HashTable::<u32, u32>::new(&mut arena);
    for i in 0..11 {
        table.put(&mut arena, i, i);
    }
    assert_eq!(table.capacity(), 16);
    table.put(&mut arena, 11, 11);
    assert_eq!(table.capacity(), 32);
    assert_eq!(table.threshold(), 24);

    for i in 12..200 {
        table.put(&mut arena, i, i);
    }
    assert_eq!(table.capacity(), 512);
    for i in 0..200 {
        assert_eq!(table.get(&arena, &i), Some(&i), "lost key {i} across resizes");
    }
}

/// Capacity never shrinks, even when every entry is removed.
#[test]
fn capacity_never_shrinks() {
    let mut arena = MapArena::new();
    let mut table = HashTable::<u32, u32>::new(&mut arena);
    for i in 0..100 {
        table.put(&mut arena, i, i);
    }
    let grown = table.capacity();
    for i in 0..100 {
        assert!(table.remove(&mut arena, &i));
    }
    assert!(table.is_empty());
    assert_eq!(table.capacity(), grown);
    assert_eq!(table.iter(&arena).count(), 0);
}

/// Growth splits each bucket on the new index bit and keeps chain order.
#[test]
fn resize_preserves_bucket_order() {
    let mut arena = MapArena::new();
    let options = TableOptions {
        initial_capacity: 2,
        load_factor: 4.0,
    };
    let mut table = HashTable::with_options(&mut arena, IdentityProvider, options)
        .expect("valid options");
    // Keys 0, 2, 4 and 6 share bucket 0 of 2.
    for key in [6_u32, 0, 4, 2, 1, 3, 5] {
        table.put(&mut arena, key, key);
    }
    assert_eq!(table.capacity(), 2);
    table.put(&mut arena, 7, 7);
    assert_eq!(table.capacity(), 4);

    let keys: Vec<u32> = table.keys(&arena).copied().collect();
    assert_eq!(keys, vec![0, 4, 1, 5, 6, 2, 3, 7]);
}

#[test]
fn options_validation() {
    let mut arena = MapArena::<u32, u32>::new();
    for load_factor in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let result = HashTable::with_options(
            &mut arena,
            DefaultProvider,
            TableOptions {
                initial_capacity: 16,
                load_factor,
            },
        );
        assert!(
            matches!(result, Err(MapError::InvalidLoadFactor(_))),
            "load factor {load_factor} accepted"
        );
    }

    for initial_capacity in [0, usize::MAX, usize::MAX / 2 + 2] {
        let result = HashTable::with_options(
            &mut arena,
            DefaultProvider,
            TableOptions {
                initial_capacity,
                load_factor: 0.75,
            },
        );
        assert_eq!(result.err(), Some(MapError::InvalidCapacity(initial_capacity)));
    }

    let table = HashTable::<u32, u32>::with_options(
        &mut arena,
        DefaultProvider,
        TableOptions {
            initial_capacity: 10,
            load_factor: 0.5,
        },
    )
    .expect("valid options");
    assert_eq!(table.capacity(), 16);
    assert_eq!(table.threshold(), 8);

    assert_eq!(
        MapError::InvalidLoadFactor(0.0).to_string(),
        "load factor 0 must be finite and positive"
    );
    assert_eq!(
        MapError::InvalidCapacity(0).to_string(),
        "initial capacity 0 has no power-of-two bucket count"
    );
}

#[test]
fn persistent_assoc_dissoc() {
    let mut arena = MapArena::new();
    let mut base = HashTable::<&str, i32>::new(&mut arena);
    base.put(&mut arena, "a", 1);
    base.put(&mut arena, "b", 2);

    let mut added = base.assoc(&mut arena, "c", 3);
    let removed = added.dissoc(&mut arena, &"a");

    assert_eq!(base.len(), 2);
    assert_eq!(added.len(), 3);
    assert_eq!(removed.len(), 2);
    assert_eq!(base.get(&arena, &"c"), None);
    assert_eq!(added.get(&arena, &"c"), Some(&3));
    assert_eq!(added.get(&arena, &"a"), Some(&1));
    assert_eq!(removed.get(&arena, &"a"), None);
    assert_eq!(removed.get(&arena, &"c"), Some(&3));
}

/// Growth triggered on a table that shares chains copies what it relinks.
#[test]
fn resize_in_shared_table() {
    let mut arena = MapArena::new();
    let mut base = HashTable::<u32, u32>::new(&mut arena);
    for i in 0..11 {
        base.mut_assoc(&mut arena, i, i);
    }
    let grown = base.assoc(&mut arena, 11, 11);
    assert_eq!(base.capacity(), 16);
    assert_eq!(grown.capacity(), 32);
    for i in 0..11 {
        assert_eq!(base.get(&arena, &i), Some(&i));
        assert_eq!(grown.get(&arena, &i), Some(&i));
    }
    assert_eq!(base.get(&arena, &11), None);
    assert_eq!(base.iter(&arena).count(), 11);
}

/// `put` and `remove` on a derived table copy one chain and keep the
/// bucket array.
#[test]
fn put_after_assoc_copies_one_chain() {
    let mut arena = MapArena::new();
    let mut a = HashTable::<u32, u32, _>::with_provider(&mut arena, IdentityProvider);
    for i in 0..1000 {
        a.put(&mut arena, i, i);
    }
    assert_eq!(a.capacity(), 2048);
    let mut b = a.assoc(&mut arena, 5000, 1);

    let before = arena.arena_len();
    assert_eq!(b.put(&mut arena, 6000, 2), None);
    assert_eq!(arena.arena_len(), (before.0 + 1, before.1));
    assert!(!b.is_exclusive());

    let before = arena.arena_len();
    assert!(b.remove(&mut arena, &10));
    assert_eq!(arena.arena_len(), before);

    assert_eq!(b.put(&mut arena, 0, 7), Some(0));
    assert_eq!(b.capacity(), 2048);
    assert_eq!(b.len(), 1001);
    assert_eq!(a.len(), 1000);
    assert_eq!(a.get(&arena, &0), Some(&0));
    assert_eq!(a.get(&arena, &10), Some(&10));
    assert_eq!(a.get(&arena, &6000), None);
}

#[test]
fn update_values_in_table() {
    let mut arena = MapArena::new();
    let mut a = HashTable::<u32, u32>::new(&mut arena);
    for i in 0..30 {
        a.put(&mut arena, i, i);
    }
    let mut b = a.shallow_clone(&mut arena);
    b.update_values(&mut arena, |k, v| k + v);
    for i in 0..30 {
        assert_eq!(a.get(&arena, &i), Some(&i));
        assert_eq!(b.get(&arena, &i), Some(&(2 * i)));
    }
}

/// Groups words by length, counting and then rendering each group.
#[test]
fn group_by_reduce_with_finisher() {
    let mut arena = MapArena::new();
    let words = ["a", "bb", "cc", "d", "eee", "ff"];
    let mut counts = HashTable::group_by_reduce(
        &mut arena,
        DefaultProvider,
        words,
        |w: &&str| w.len(),
        |_| 0_usize,
        |count, _| *count += 1,
    );

    assert_eq!(counts.len(), 3);
    assert_eq!(counts.get(&arena, &1), Some(&2));
    assert_eq!(counts.get(&arena, &2), Some(&3));
    assert_eq!(counts.get(&arena, &3), Some(&1));

    counts.update_values(&mut arena, |len, count| len * 100 + count);
    assert_eq!(counts.get(&arena, &2), Some(&203));
}
