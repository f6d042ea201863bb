mod collision;
mod hashing;
mod reduce;
mod table;

use crate::HashProvider;

/// Hashes a `u32` key to itself, so trie paths can be planned by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProvider;

impl HashProvider<u32> for IdentityProvider {
    fn hash(&self, key: &u32) -> u32 {
        *key
    }

    fn equals(&self, a: &u32, b: &u32) -> bool {
        a == b
    }
}

/// Hashes every key to the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantProvider;

impl<K: PartialEq> HashProvider<K> for ConstantProvider {
    fn hash(&self, _key: &K) -> u32 {
        0xABCD
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}
