//! Hashing kernel: 32-bit mixing, string hashing and collection-hash
//! combinators.
//!
//! Every digest here is a `u32` computed with wrapping arithmetic, so the
//! same logical value hashes identically regardless of which container or
//! iteration order produced it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Murmur3 seed used by [`mix_collection_hash`].
const M3_SEED: u32 = 0;

/// Murmur3 `c1` constant.
const M3_C1: u32 = 0xCC9E_2D51;

/// Murmur3 `c2` constant.
const M3_C2: u32 = 0x1B87_3593;

/// First string lane seed.
const LANE_1_SEED: u32 = 0xDEAD_BEEF;

/// Second string lane seed.
const LANE_2_SEED: u32 = 0x41C6_CE57;

/// 2^32, the modulus of `ToUint32`.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Avalanche finisher: folds the high half into the low half.
#[inline]
#[must_use]
pub const fn mix32(h: u32) -> u32 {
    h ^ (h >> 16)
}

/// Dual-lane multiply-xor string hash over UTF-16 code units.
///
/// Both lanes absorb every code unit; the result is the first lane after
/// cross-lane finalization.
#[must_use]
pub fn hash_string(s: &str) -> u32 {
    let mut h1 = LANE_1_SEED;
    let mut h2 = LANE_2_SEED;
    for unit in s.encode_utf16() {
        let ch = u32::from(unit);
        h1 = (h1 ^ ch).wrapping_mul(2_654_435_761);
        h2 = (h2 ^ ch).wrapping_mul(1_597_334_677);
    }
    (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507) ^ (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909)
}

/// Hashes a number by its floor, reduced modulo 2^32, then mixed.
///
/// Non-finite inputs hash as zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hash_number(v: f64) -> u32 {
    if !v.is_finite() {
        return 0;
    }
    mix32(v.floor().rem_euclid(TWO_POW_32) as u32)
}

/// Murmur3 `k1` mixing step.
#[inline]
#[must_use]
pub const fn mix_k1(k1: u32) -> u32 {
    M3_C2.wrapping_mul(k1.wrapping_mul(M3_C1).rotate_left(15))
}

/// Murmur3 `h1` mixing step.
#[inline]
#[must_use]
pub const fn mix_h1(h1: u32, k1: u32) -> u32 {
    0xE654_6B64_u32.wrapping_add(5_u32.wrapping_mul((h1 ^ k1).rotate_left(13)))
}

/// Murmur3 finalizer, folding in the element count.
#[inline]
#[must_use]
pub const fn fmix(h1: u32, len: u32) -> u32 {
    let s = h1 ^ len;
    let s = s ^ (s >> 16);
    let s = s.wrapping_mul(0x85EB_CA6B);
    let s = s ^ (s >> 13);
    let s = s.wrapping_mul(0xC2B2_AE35);
    s ^ (s >> 16)
}

/// Finalizes a running collection accumulator into a single digest.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn mix_collection_hash(basis: u32, count: usize) -> u32 {
    fmix(mix_h1(M3_SEED, mix_k1(basis)), count as u32)
}

/// Order-sensitive collection hash accumulator: `h = 31*h + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedHash {
    n: usize,
    h: u32,
}

impl OrderedHash {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self { n: 0, h: 1 }
    }

    /// Folds one element hash into the accumulator.
    pub fn accept(&mut self, x: u32) {
        self.n += 1;
        self.h = self.h.wrapping_mul(31).wrapping_add(x);
    }

    /// Returns the finished digest.
    #[must_use]
    pub const fn finish(&self) -> u32 {
        mix_collection_hash(self.h, self.n)
    }
}

impl Default for OrderedHash {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-insensitive collection hash accumulator: wrapping sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnorderedHash {
    n: usize,
    h: u32,
}

impl UnorderedHash {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self { n: 0, h: 0 }
    }

    /// Folds one element hash into the accumulator.
    pub fn accept(&mut self, x: u32) {
        self.n += 1;
        self.h = self.h.wrapping_add(x);
    }

    /// Returns the finished digest.
    #[must_use]
    pub const fn finish(&self) -> u32 {
        mix_collection_hash(self.h, self.n)
    }
}

/// Hashes a sequence of element hashes in order.
#[must_use]
pub fn hash_ordered<I: IntoIterator<Item = u32>>(hashes: I) -> u32 {
    let mut acc = OrderedHash::new();
    for h in hashes {
        acc.accept(h);
    }
    acc.finish()
}

/// Hashes a multiset of element hashes, independent of order.
#[must_use]
pub fn hash_unordered<I: IntoIterator<Item = u32>>(hashes: I) -> u32 {
    let mut acc = UnorderedHash::new();
    for h in hashes {
        acc.accept(h);
    }
    acc.finish()
}

/// Values the kernel knows how to hash.
///
/// Numbers hash by value, text by its string form, sequences in order and
/// sets/maps without regard to order.
pub trait HashValue {
    /// Returns the 32-bit kernel hash of `self`.
    fn hash_value(&self) -> u32;

    /// Returns `true` for the absent value, which hashes to zero.
    fn is_null(&self) -> bool {
        false
    }
}

macro_rules! hash_value_int {
    ($($t:ty),*) => {
        $(
            impl HashValue for $t {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                fn hash_value(&self) -> u32 {
                    mix32(*self as u32)
                }
            }
        )*
    };
}

hash_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl HashValue for f64 {
    fn hash_value(&self) -> u32 {
        hash_number(*self)
    }
}

impl HashValue for f32 {
    fn hash_value(&self) -> u32 {
        hash_number(f64::from(*self))
    }
}

impl HashValue for bool {
    fn hash_value(&self) -> u32 {
        hash_string(if *self { "true" } else { "false" })
    }
}

impl HashValue for char {
    fn hash_value(&self) -> u32 {
        let mut buf = [0_u8; 4];
        hash_string(self.encode_utf8(&mut buf))
    }
}

impl HashValue for str {
    fn hash_value(&self) -> u32 {
        hash_string(self)
    }
}

impl HashValue for String {
    fn hash_value(&self) -> u32 {
        hash_string(self)
    }
}

impl<T: HashValue + ?Sized> HashValue for &T {
    fn hash_value(&self) -> u32 {
        (**self).hash_value()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<T: HashValue + ?Sized> HashValue for Box<T> {
    fn hash_value(&self) -> u32 {
        (**self).hash_value()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<T: HashValue> HashValue for Option<T> {
    fn hash_value(&self) -> u32 {
        self.as_ref().map_or(0, HashValue::hash_value)
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }
}

impl<T: HashValue> HashValue for [T] {
    fn hash_value(&self) -> u32 {
        hash_ordered(self.iter().map(HashValue::hash_value))
    }
}

impl<T: HashValue, const N: usize> HashValue for [T; N] {
    fn hash_value(&self) -> u32 {
        self.as_slice().hash_value()
    }
}

impl<T: HashValue> HashValue for Vec<T> {
    fn hash_value(&self) -> u32 {
        self.as_slice().hash_value()
    }
}

impl<A: HashValue, B: HashValue> HashValue for (A, B) {
    fn hash_value(&self) -> u32 {
        hash_ordered([self.0.hash_value(), self.1.hash_value()])
    }
}

impl<A: HashValue, B: HashValue, C: HashValue> HashValue for (A, B, C) {
    fn hash_value(&self) -> u32 {
        hash_ordered([self.0.hash_value(), self.1.hash_value(), self.2.hash_value()])
    }
}

impl<T: HashValue> HashValue for BTreeSet<T> {
    fn hash_value(&self) -> u32 {
        hash_unordered(self.iter().map(HashValue::hash_value))
    }
}

impl<T: HashValue, S> HashValue for HashSet<T, S> {
    fn hash_value(&self) -> u32 {
        hash_unordered(self.iter().map(HashValue::hash_value))
    }
}

impl<K: HashValue, V: HashValue> HashValue for BTreeMap<K, V> {
    fn hash_value(&self) -> u32 {
        hash_unordered(
            self.iter()
                .map(|(k, v)| hash_ordered([k.hash_value(), v.hash_value()])),
        )
    }
}

impl<K: HashValue, V: HashValue, S> HashValue for HashMap<K, V, S> {
    fn hash_value(&self) -> u32 {
        hash_unordered(
            self.iter()
                .map(|(k, v)| hash_ordered([k.hash_value(), v.hash_value()])),
        )
    }
}
