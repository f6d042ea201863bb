//! Bitmap hash trie and open hash table over one ownership-tagged leaf
//! protocol.
//!
//! Both containers are lightweight handles into a caller-owned
//! [`MapArena`]. Every node and leaf records the owner allowed to mutate it,
//! which lets one representation serve two disciplines:
//!
//! - **Persistent updates**: [`BitmapTrie::assoc`] and friends return a new
//!   container sharing all untouched structure with the original.
//! - **In-place edits**: a [`Transient`] session mutates an exclusively owned
//!   container directly, for fast bulk building.
//!
//! Reads, folds, the structural hash and the string form all go through the
//! [`Reducible`] and [`Lookup`] traits.
//!
//! # Example
//!
//! ```
//! use bitmap_trie::{BitmapTrie, Lookup, MapArena};
//!
//! let mut arena = MapArena::new();
//! let mut v1: BitmapTrie<u32, &str> = BitmapTrie::new(&mut arena);
//! v1.put(&mut arena, 1, "one");
//!
//! let v2 = v1.assoc(&mut arena, 2, "two");
//! assert_eq!(v1.get(&arena, &2), None);
//! assert_eq!(v2.get(&arena, &2), Some(&"two"));
//! ```
//!
//! # References
//!
//! - Bagwell, 2001, "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod hash;
pub mod iter;
pub mod node;
pub mod provider;
pub mod reduce;
pub mod store;

mod arena;
mod chain;
mod error;
mod ops;
mod table;
mod transient;
mod trie;

#[cfg(test)]
mod tests;

pub use arena::MapArena;
pub use error::MapError;
pub use provider::{DefaultProvider, HashProvider, HasherProvider};
pub use reduce::{Lookup, Reducible};
pub use table::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, HashTable, TableOptions};
pub use transient::Transient;
pub use trie::BitmapTrie;
