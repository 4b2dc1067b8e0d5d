//! Lazily populated hash slot shared by features and namespaces.

use std::sync::atomic::{AtomicI64, Ordering};

const EMPTY: i64 = i64::MIN;

/// A single cached 32-bit hash.
///
/// The slot is written during scoring through a shared reference. Concurrent
/// writers race benignly: every writer stores the same value, and a single
/// atomic store can never be observed torn.
pub struct HashCache(AtomicI64);

impl HashCache {
    /// An empty slot.
    pub const fn new() -> Self {
        Self(AtomicI64::new(EMPTY))
    }

    /// The cached hash, if computed.
    #[inline]
    pub fn get(&self) -> Option<i32> {
        let v = self.0.load(Ordering::Relaxed);
        (v != EMPTY).then_some(v as i32)
    }

    #[inline]
    pub fn set(&self, hash: i32) {
        self.0.store(hash as i64, Ordering::Relaxed);
    }

    #[inline]
    pub fn clear(&self) {
        self.0.store(EMPTY, Ordering::Relaxed);
    }

    /// Return the cached hash, computing and storing it on first use.
    #[inline]
    pub fn get_or_compute(&self, compute: impl FnOnce() -> i32) -> i32 {
        match self.get() {
            Some(hash) => hash,
            None => {
                let hash = compute();
                self.set(hash);
                hash
            }
        }
    }
}

impl Default for HashCache {
    fn default() -> Self {
        Self::new()
    }
}

/// A clone starts empty: the cached hash is only valid for the namespace the
/// original was scored in.
impl Clone for HashCache {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HashCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(hash) => write!(f, "HashCache({hash})"),
            None => f.write_str("HashCache(empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(HashCache::new().get(), None);
        assert_eq!(HashCache::default().get(), None);
    }

    #[test]
    fn stores_extreme_values() {
        let cache = HashCache::new();
        for hash in [0, -1, i32::MIN, i32::MAX] {
            cache.set(hash);
            assert_eq!(cache.get(), Some(hash));
        }
        cache.clear();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn computes_once() {
        let cache = HashCache::new();
        let mut calls = 0;
        assert_eq!(cache.get_or_compute(|| { calls += 1; 7 }), 7);
        assert_eq!(cache.get_or_compute(|| { calls += 1; 8 }), 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn clone_starts_empty() {
        let cache = HashCache::new();
        cache.set(42);
        assert_eq!(cache.clone().get(), None);
        assert_eq!(cache.get(), Some(42));
    }
}
