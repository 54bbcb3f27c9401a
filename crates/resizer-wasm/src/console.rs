//! Boundary logging to the browser console.
//!
//! The core crate reports through `tracing`; failures that surface at the
//! JS boundary are also written here so they show up without a subscriber.

use wasm_bindgen::JsValue;

pub(crate) fn info(message: &str) {
    web_sys::console::info_1(&JsValue::from_str(message));
}

pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

pub(crate) fn error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}
