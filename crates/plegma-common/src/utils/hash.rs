//! Fast, non-cryptographic hashing.
//!
//! Plegma hashes short strings (column names) and small integers on hot
//! paths, so the default SipHash is overkill. These aliases pair
//! `hashbrown`'s raw tables with AHash.

/// A `HashMap` using AHash.
pub type FxHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// A `HashSet` using AHash.
pub type FxHashSet<T> = hashbrown::HashSet<T, ahash::RandomState>;
