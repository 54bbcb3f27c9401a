//! `localStorage`-backed preset persistence.

use resizer_core::preset::{PresetStore, StoreError};
use web_sys::Storage;

use crate::types::js_error_message;

/// Private browsing and sandboxed frames may deny storage; presets then
/// silently stop persisting.
pub struct LocalStoragePresets {
    storage: Option<Storage>,
}

impl LocalStoragePresets {
    pub fn from_window() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self { storage }
    }
}

impl PresetStore for LocalStoragePresets {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage is not available".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(js_error_message(&e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_storage_reads_nothing() {
        let mut store = LocalStoragePresets { storage: None };
        assert_eq!(store.get("image-resizer-preset"), None);
        assert!(matches!(
            store.set("image-resizer-preset", "{}"),
            Err(StoreError::Unavailable(_))
        ));
    }
}
