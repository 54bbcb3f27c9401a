//! In-process [`CacheStorage`], for hosts without a browser cache and for tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::store::{CacheHandle, CacheStorage};
use super::types::{AssetResponse, CacheError};

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Rc<RefCell<HashMap<String, AssetResponse>>>,
}

impl MemoryCache {
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl CacheHandle for MemoryCache {
    async fn lookup(&self, key: &str) -> Result<Option<AssetResponse>, CacheError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn put(&self, key: &str, response: &AssetResponse) -> Result<(), CacheError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), response.clone());
        Ok(())
    }
}

/// Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStorage {
    caches: Rc<RefCell<BTreeMap<String, MemoryCache>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache registered under `name`, without creating it.
    pub fn get(&self, name: &str) -> Option<MemoryCache> {
        self.caches.borrow().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.caches.borrow().keys().cloned().collect()
    }
}

impl CacheStorage for MemoryCacheStorage {
    type Handle = MemoryCache;

    async fn open(&self, name: &str) -> Result<MemoryCache, CacheError> {
        Ok(self
            .caches
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .clone())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.names())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.caches.borrow_mut().remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_and_reuses() {
        let storage = MemoryCacheStorage::new();
        let a = storage.open("c").await.unwrap();
        a.put("k", &AssetResponse::ok("text/plain", "v")).await.unwrap();
        let b = storage.open("c").await.unwrap();
        assert!(b.lookup("k").await.unwrap().is_some());
        assert_eq!(storage.names(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_handle_outlives_deletion() {
        let storage = MemoryCacheStorage::new();
        let handle = storage.open("old").await.unwrap();
        handle
            .put("k", &AssetResponse::ok("text/plain", "v"))
            .await
            .unwrap();

        assert!(storage.delete("old").await.unwrap());
        assert!(storage.names().is_empty());
        assert_eq!(
            handle.lookup("k").await.unwrap().map(|r| r.body),
            Some(b"v".to_vec())
        );
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let storage = MemoryCacheStorage::new();
        assert!(!storage.delete("nope").await.unwrap());
    }
}
