//! Offline availability of the app shell.
//!
//! Each deployment installs a generation named `{prefix}-v{version}` holding
//! the manifest assets. Activating a generation deletes every older one under
//! the same prefix. While active it answers same-origin GET requests:
//! documents, scripts and styles network-first, everything else cache-first.
//!
//! Browser bindings live in the wasm crate; [`MemoryCacheStorage`] backs tests.

mod generation;
mod manager;
mod memory;
mod store;
mod types;

pub use generation::{
    generation_name, is_generation_of, CacheConfig, CacheGeneration, CACHE_PREFIX,
    DEFAULT_MANIFEST, SKIP_WAITING,
};
pub use manager::{AssetCacheManager, PendingWrite, Routed};
pub use memory::{MemoryCache, MemoryCacheStorage};
pub use store::{CacheHandle, CacheStorage, Network};
pub use types::{
    AssetRequest, AssetResponse, CacheError, Destination, LifecycleState, Strategy,
};
