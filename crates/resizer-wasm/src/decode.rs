//! Image decoding WASM bindings.
//!
//! Stateless helpers for hosts that manage their own state. The full
//! HEIC-tolerant cascade lives behind [`ResizerSession`](crate::ResizerSession).
//!
//! # Functions
//!
//! - [`decode_image`] - Decode JPEG, PNG or WebP bytes with EXIF orientation applied
//! - [`is_heif_file`] - Whether a file must go through HEIC/HEIF conversion
//! - [`accepts_drop`] - Whether a dropped file should be loaded at all
//! - [`heif_name_as_jpeg`] - Rename `photo.heic` to `photo.jpg`
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, is_heif_file } from '@image-resizer/wasm';
//!
//! if (!is_heif_file(file.name, file.type)) {
//!   const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//!   console.log(`Decoded ${image.width}x${image.height}`);
//! }
//! ```

use crate::types::{to_js_error, JsDecodedImage};
use resizer_core::decode::{self, SourceFile};
use wasm_bindgen::prelude::*;

/// Decode image bytes and apply EXIF orientation.
///
/// # Errors
///
/// Returns an error for empty, unrecognised or corrupted data.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_oriented(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(to_js_error)
}

/// HEIC/HEIF by extension or MIME type.
#[wasm_bindgen]
pub fn is_heif_file(name: &str, mime_type: &str) -> bool {
    SourceFile::new(Vec::new(), mime_type, name).is_heif()
}

/// Drag-and-drop only accepts `image/*` MIME types.
#[wasm_bindgen]
pub fn accepts_drop(mime_type: &str) -> bool {
    SourceFile::new(Vec::new(), mime_type, "").accepts_drop()
}

#[wasm_bindgen]
pub fn heif_name_as_jpeg(name: &str) -> String {
    decode::heif_name_as_jpeg(name)
}
