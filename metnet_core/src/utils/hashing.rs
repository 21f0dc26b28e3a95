//! Utility functions for getting hashes
use std::hash::{DefaultHasher, Hash, Hasher};

/// Hash a value with a fixed-key hasher, so the result is the same in every run
pub(crate) fn calculate_hash<T: Hash + ?Sized>(t: &T) -> u64 {
    let mut s = DefaultHasher::new();
    t.hash(&mut s);
    s.finish()
}

/// Map a value onto one of `buckets` positions
pub(crate) fn hash_to_bucket<T: Hash + ?Sized>(t: &T, buckets: usize) -> usize {
    (calculate_hash(t) % buckets as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_buckets() {
        let first = hash_to_bucket("CCO", 1024);
        let second = hash_to_bucket("CCO", 1024);
        assert_eq!(first, second);
        assert!(first < 1024);
        assert_eq!(hash_to_bucket("anything", 1), 0);
    }
}
