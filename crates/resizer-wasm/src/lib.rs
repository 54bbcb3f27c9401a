//! Image Resizer WASM - WebAssembly bindings for the image resizer
//!
//! This crate exposes the resizer-core functionality to JavaScript.
//!
//! # Module Structure
//!
//! - `session` - The stateful resizer a page drives ([`ResizerSession`])
//! - `sw` - Offline asset cache for the service worker ([`AssetWorker`])
//! - `decode` / `encode` - Stateless decode and resize-and-encode helpers
//! - `converter` - JavaScript-backed HEIC/HEIF capabilities
//! - `types` - WASM-compatible wrapper types for image data
//!
//! # Usage
//!
//! ```typescript
//! import init, { ResizerSession } from '@image-resizer/wasm';
//!
//! await init();
//! const session = new ResizerSession(undefined, heicToJpeg);
//! await session.load(new Uint8Array(await file.arrayBuffer()), file.type, file.name);
//! console.log(`Loaded ${session.original_width}x${session.original_height}`);
//! ```

use wasm_bindgen::prelude::*;

mod console;
mod converter;
mod decode;
mod encode;
mod export;
mod session;
mod storage;
mod sw;
mod types;

// Re-export public types
pub use decode::{accepts_drop, decode_image, heif_name_as_jpeg, is_heif_file};
pub use encode::{output_mime_type, resize_and_encode};
pub use session::ResizerSession;
pub use sw::AssetWorker;
pub use types::{JsDecodedImage, JsOutputBlob};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Guidance shown when a HEIC/HEIF photo cannot be opened.
#[wasm_bindgen]
pub fn heif_remediation() -> String {
    resizer_core::decode::HEIF_REMEDIATION.to_string()
}
