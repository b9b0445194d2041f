use std::hash::{Hash, Hasher};

#[cfg(feature = "std-hash")]
pub mod default {
    pub use std::collections::hash_map::DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::new()
    }
}

#[cfg(not(feature = "std-hash"))]
pub mod default {
    // fast branch
    pub use ahash::AHasher as DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::default()
    }
}

/// Hashes an arbitrary value into a 64-bit identity.
///
/// Used to turn user supplied keys (strings, tuples, ids) into the `u64`
/// payload carried by item keys and slot ids.
#[inline]
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = default::new();
    key.hash(&mut hasher);
    hasher.finish()
}
