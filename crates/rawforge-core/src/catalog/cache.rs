//! Bounded insertion-order cache of opened profiles.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::color::ProfileHandle;

/// Default number of profiles kept open.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// FIFO cache: when full, the earliest-inserted entry is evicted
/// regardless of how recently it was read.
pub struct ProfileCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<PathBuf, ProfileHandle>,
    order: VecDeque<PathBuf>,
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ProfileCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn get(&self, path: &Path) -> Option<ProfileHandle> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.entries.get(path).cloned()
    }

    /// Insert a handle, returning the path evicted to make room.
    ///
    /// Re-inserting a cached path replaces the handle but keeps its
    /// original position in the eviction order.
    pub fn insert(&self, path: PathBuf, handle: ProfileHandle) -> Option<PathBuf> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = inner.entries.get_mut(&path) {
            *existing = handle;
            return None;
        }

        let mut evicted = None;
        if inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        inner.order.push_back(path.clone());
        inner.entries.insert(path, handle);
        evicted
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: &str) -> (PathBuf, ProfileHandle) {
        let path = PathBuf::from(format!("/profiles/{name}.icm"));
        (path.clone(), ProfileHandle::new(path, name.as_bytes().to_vec()))
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = ProfileCache::new(3);
        for i in 0..10 {
            let (path, h) = handle(&format!("p{i}"));
            cache.insert(path, h);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_evicts_earliest_inserted_not_least_recent() {
        let cache = ProfileCache::new(2);
        let (a, ha) = handle("a");
        let (b, hb) = handle("b");
        let (c, hc) = handle("c");

        assert_eq!(cache.insert(a.clone(), ha), None);
        assert_eq!(cache.insert(b.clone(), hb), None);

        // Reading `a` does not protect it
        assert!(cache.get(&a).is_some());

        assert_eq!(cache.insert(c.clone(), hc), Some(a.clone()));
        assert!(cache.get(&a).is_none());
        assert!(cache.get(&b).is_some());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let cache = ProfileCache::new(2);
        let (a, ha) = handle("a");
        let (b, hb) = handle("b");
        let (c, hc) = handle("c");

        cache.insert(a.clone(), ha.clone());
        cache.insert(b.clone(), hb);
        assert_eq!(cache.insert(a.clone(), ha), None);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.insert(c, hc), Some(a));
    }

    #[test]
    fn test_clear() {
        let cache = ProfileCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
        let (a, ha) = handle("a");
        cache.insert(a, ha);
        cache.clear();
        assert!(cache.is_empty());
    }
}
