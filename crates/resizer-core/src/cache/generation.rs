//! Versioned cache naming and the cache's configuration.

use serde::{Deserialize, Serialize};

/// Prefix shared by every cache generation this app creates.
pub const CACHE_PREFIX: &str = "image-resizer";

/// Message a page posts to promote a waiting generation immediately.
pub const SKIP_WAITING: &str = "SKIP_WAITING";

/// The app shell, relative to the worker's origin.
pub const DEFAULT_MANIFEST: [&str; 6] = [
    "/image-resizer/",
    "/image-resizer/index.html",
    "/image-resizer/style.css",
    "/image-resizer/app.js",
    "/image-resizer/icon-192.png",
    "/image-resizer/icon-512.png",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub prefix: String,
    /// Bumped on every deploy that changes the manifest.
    pub version: u32,
    pub manifest: Vec<String>,
    /// Request promotion as soon as installation succeeds.
    pub skip_waiting_on_install: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: CACHE_PREFIX.to_string(),
            version: 1,
            manifest: DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect(),
            skip_waiting_on_install: true,
        }
    }
}

impl CacheConfig {
    pub fn generation(&self) -> CacheGeneration {
        CacheGeneration {
            version: self.version,
            name: generation_name(&self.prefix, self.version),
            manifest: self.manifest.clone(),
        }
    }
}

/// `{prefix}-v{version}`
pub fn generation_name(prefix: &str, version: u32) -> String {
    format!("{prefix}-v{version}")
}

/// Whether `name` is some generation under `prefix`. Caches that do not
/// match belong to someone else and are never touched.
pub fn is_generation_of(prefix: &str, name: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix("-v"))
        .is_some_and(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
}

/// One deployment's named cache and the assets it must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeneration {
    pub version: u32,
    pub name: String,
    pub manifest: Vec<String>,
}

impl CacheGeneration {
    /// A cache this generation should delete when it becomes current.
    pub fn is_stale(&self, prefix: &str, name: &str) -> bool {
        name != self.name && is_generation_of(prefix, name)
    }
}
