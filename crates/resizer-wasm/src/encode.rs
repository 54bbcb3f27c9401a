//! Resize-and-encode WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, resize_and_encode } from '@image-resizer/wasm';
//!
//! const image = decode_image(bytes);
//! const out = resize_and_encode(image, 1200, 800, 'holiday.png', 0.92, 2);
//! const blob = new Blob([out.bytes()], { type: out.mimeType });
//! ```

use crate::types::{filter_from_u8, to_js_error, JsDecodedImage, JsOutputBlob};
use resizer_core::dimensions::TargetDimensions;
use resizer_core::encode::{OutputSpec, RasterTransformer, DEFAULT_QUALITY};
use wasm_bindgen::prelude::*;

/// Resize `image` to exactly `width` x `height` and encode it in the format
/// implied by `file_name` (PNG, WebP, otherwise JPEG at `quality`).
///
/// # Errors
///
/// Returns an error if either dimension is zero or encoding fails.
#[wasm_bindgen]
pub fn resize_and_encode(
    image: &JsDecodedImage,
    width: u32,
    height: u32,
    file_name: &str,
    quality: f32,
    filter: u8,
) -> Result<JsOutputBlob, JsValue> {
    let spec = OutputSpec::for_file_name(file_name, quality);
    RasterTransformer::with_filter(filter_from_u8(filter))
        .transform(&image.to_decoded(), TargetDimensions::new(width, height), &spec)
        .map(JsOutputBlob::from)
        .map_err(to_js_error)
}

/// MIME type an export named `file_name` is encoded as.
#[wasm_bindgen]
pub fn output_mime_type(file_name: &str) -> String {
    OutputSpec::for_file_name(file_name, DEFAULT_QUALITY)
        .mime_type()
        .to_string()
}
