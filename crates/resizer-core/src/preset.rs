//! Persistence of the last-used quick-size preset.
//!
//! One JSON value under one key. Missing, unreadable or malformed data is
//! never an error: it simply means there is no preset.

use thiserror::Error;
use tracing::warn;

use crate::dimensions::Preset;

/// Storage key the preset lives under unless configured otherwise.
pub const STORAGE_KEY: &str = "image-resizer-preset";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Preset storage unavailable: {0}")]
    Unavailable(String),
}

/// String key/value storage (browser `localStorage` or similar).
pub trait PresetStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read the stored preset, if any.
pub fn load_preset(store: &impl PresetStore, key: &str) -> Option<Preset> {
    let raw = store.get(key)?;
    match serde_json::from_str::<Preset>(&raw) {
        Ok(preset) => Some(preset),
        Err(e) => {
            warn!(key = key, error = %e, "ignoring unreadable preset");
            None
        }
    }
}

/// Persist `preset`. Failures are logged and otherwise ignored.
pub fn save_preset(store: &mut impl PresetStore, key: &str, preset: &Preset) {
    let json = match serde_json::to_string(preset) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "could not serialise preset");
            return;
        }
    };
    if let Err(e) = store.set(key, &json) {
        warn!(key = key, error = %e, "could not persist preset");
    }
}
