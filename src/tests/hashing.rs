use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::hash::{
    HashValue, OrderedHash, UnorderedHash, fmix, hash_number, hash_ordered, hash_string,
    hash_unordered, mix_collection_hash, mix_h1, mix_k1, mix32,
};
use crate::provider::{DefaultProvider, HashProvider, HasherProvider};

#[test]
fn mix32_folds_high_half() {
    assert_eq!(mix32(0), 0);
    assert_eq!(mix32(0x1234_5678), 0x1234_5678 ^ 0x1234);
    assert_eq!(mix32(0xFFFF_0000), 0xFFFF_FFFF);
}

#[test]
fn murmur_steps_fix_zero() {
    assert_eq!(mix_k1(0), 0);
    assert_eq!(fmix(0, 0), 0);
    assert_eq!(mix_h1(0, 0), 0xE654_6B64);
}

/// `fmix` folds the count in, so equal accumulators of different sizes differ.
#[test]
fn collection_hash_depends_on_count() {
    assert_ne!(mix_collection_hash(7, 1), mix_collection_hash(7, 2));
}

#[test]
fn string_hash_is_deterministic() {
    assert_eq!(hash_string("hello"), hash_string("hello"));
    assert_eq!("hello".hash_value(), String::from("hello").hash_value());
    assert_ne!(hash_string(""), hash_string("a"));
    assert_ne!(hash_string("ab"), hash_string("ba"));
}

#[test]
fn text_like_values_hash_by_string_form() {
    assert_eq!('é'.hash_value(), hash_string("é"));
    assert_eq!(true.hash_value(), hash_string("true"));
    assert_eq!(false.hash_value(), hash_string("false"));
}

/// Numbers hash by their floor, reduced modulo 2^32.
#[test]
fn numbers_hash_by_floor() {
    assert_eq!(hash_number(3.7), hash_number(3.0));
    assert_eq!(3_i32.hash_value(), hash_number(3.0));
    assert_eq!(3.9_f64.hash_value(), 3_u64.hash_value());
    assert_eq!((-1_i32).hash_value(), hash_number(-1.0));
    assert_eq!(hash_number(4_294_967_296.0), hash_number(0.0));
    assert_eq!(hash_number(f64::NAN), 0);
    assert_eq!(hash_number(f64::INFINITY), 0);
}

#[test]
fn null_hashes_to_zero() {
    let none: Option<&str> = None;
    assert_eq!(none.hash_value(), 0);
    assert!(none.is_null());
    assert!(!Some("x").is_null());
    assert_eq!(Some("x").hash_value(), "x".hash_value());
}

/// Ordered hashing depends on element order.
#[test]
fn ordered_hash_depends_on_order() {
    assert_ne!(vec![1_i32, 2].hash_value(), vec![2_i32, 1].hash_value());
    assert_eq!(vec![1_i32, 2].hash_value(), [1_i32, 2].hash_value());
    assert_eq!((1_i32, 2_i32).hash_value(), vec![1_i32, 2].hash_value());
}

/// Unordered hashing only sees the multiset of element hashes.
#[test]
fn unordered_hash_ignores_order() {
    let a: BTreeSet<u32> = [5, 1, 9].into_iter().collect();
    let b: HashSet<u32> = [9, 5, 1].into_iter().collect();
    assert_eq!(a.hash_value(), b.hash_value());
    assert_eq!(
        hash_unordered([1_u32, 2, 3]),
        hash_unordered([3_u32, 1, 2])
    );

    let m1: BTreeMap<&str, u32> = [("a", 1), ("b", 2)].into_iter().collect();
    let m2: HashMap<&str, u32> = [("b", 2), ("a", 1)].into_iter().collect();
    assert_eq!(m1.hash_value(), m2.hash_value());
}

#[test]
fn accumulators_match_helpers() {
    let mut ordered = OrderedHash::new();
    let mut unordered = UnorderedHash::new();
    for x in [4_u32, 8, 15] {
        ordered.accept(x);
        unordered.accept(x);
    }
    assert_eq!(ordered.finish(), hash_ordered([4, 8, 15]));
    assert_eq!(unordered.finish(), hash_unordered([4, 8, 15]));
    assert_eq!(OrderedHash::new().finish(), mix_collection_hash(1, 0));
    assert_eq!(UnorderedHash::default().finish(), mix_collection_hash(0, 0));
}

#[test]
fn default_provider_uses_kernel() {
    let p = DefaultProvider;
    assert_eq!(HashProvider::<str>::hash(&p, "abc"), hash_string("abc"));
    assert!(p.equals(&7_u32, &7));
    assert!(p.is_null(&None::<u32>));
    assert!(!p.is_null(&Some(1_u32)));
}

#[test]
fn hasher_provider_is_consistent() {
    let p = HasherProvider::<std::collections::hash_map::RandomState>::default();
    assert_eq!(p.hash(&"key"), p.hash(&"key"));
    assert!(p.equals(&"key", &"key"));
    assert!(!p.equals(&"key", &"other"));
    assert!(!p.is_null(&"key"));
}
