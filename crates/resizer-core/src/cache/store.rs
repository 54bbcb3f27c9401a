//! Seams between the cache manager and its host.

use super::types::{AssetRequest, AssetResponse, CacheError};

/// The named-cache registry (the browser's `CacheStorage`).
#[allow(async_fn_in_trait)]
pub trait CacheStorage {
    type Handle: CacheHandle;

    /// Open `name`, creating it if absent.
    async fn open(&self, name: &str) -> Result<Self::Handle, CacheError>;
    async fn keys(&self) -> Result<Vec<String>, CacheError>;
    /// Returns whether a cache by that name existed.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;
}

/// One opened cache. A handle stays usable after its cache is deleted
/// from the registry.
#[allow(async_fn_in_trait)]
pub trait CacheHandle {
    async fn lookup(&self, key: &str) -> Result<Option<AssetResponse>, CacheError>;
    async fn put(&self, key: &str, response: &AssetResponse) -> Result<(), CacheError>;
}

#[allow(async_fn_in_trait)]
pub trait Network {
    /// `Err` only for transport failures; HTTP errors come back as responses.
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, CacheError>;
}
