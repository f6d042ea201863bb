//! Error type for map operations.

use thiserror::Error;

/// Errors reported by map and leaf operations.
///
/// Structural operations never fail on their own; these cover explicit
/// positional access, calls through the map-as-function view and invalid
/// construction options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Positional access past the end of a fixed-size view.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of valid positions.
        len: usize,
    },
    /// A map was called as a function with an unsupported number of arguments.
    #[error("invalid invocation with {arity} argument(s); expected 1 or 2")]
    InvalidInvocation {
        /// Number of arguments supplied.
        arity: usize,
    },
    /// A hash table was configured with a load factor that is not a finite
    /// positive number.
    #[error("load factor {0} must be finite and positive")]
    InvalidLoadFactor(f32),
    /// A hash table was configured with an initial capacity of zero or one
    /// with no power-of-two bucket count.
    #[error("initial capacity {0} has no power-of-two bucket count")]
    InvalidCapacity(usize),
}
