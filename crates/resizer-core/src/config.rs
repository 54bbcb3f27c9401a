//! Settings for the image pipeline.
//!
//! Every field has a default, so hosts only pass what they want to change.
//! The offline cache has its own [`CacheConfig`](crate::cache::CacheConfig).

use serde::{Deserialize, Serialize};

use crate::encode::DEFAULT_QUALITY;
use crate::preset::STORAGE_KEY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResizerConfig {
    /// Quality for lossy output and HEIC/HEIF conversion (0.0 to 1.0).
    pub quality: f32,
    /// Key for the persisted last-used preset.
    pub preset_storage_key: String,
    /// Basename used when the user clears the export name field.
    pub default_basename: String,
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            preset_storage_key: STORAGE_KEY.to_string(),
            default_basename: "image".to_string(),
        }
    }
}
