//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core resizer
//! types, handling the conversion between Rust and JavaScript representations.

use std::fmt::Display;

use resizer_core::decode::{DecodedImage, FilterType};
use resizer_core::encode::OutputBlob;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A decoded image wrapper for JavaScript.
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy
/// is made to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and RGBA pixel data
    /// (4 bytes per pixel, row-major order, the layout of `ImageData`).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// Optional; wasm-bindgen's finalizer handles cleanup automatically.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Clones the pixel data.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// An encoded export ready to be wrapped in a `Blob`.
#[wasm_bindgen]
pub struct JsOutputBlob {
    bytes: Vec<u8>,
    mime_type: String,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl JsOutputBlob {
    /// Encoded bytes as Uint8Array (a copy).
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

impl From<OutputBlob> for JsOutputBlob {
    fn from(blob: OutputBlob) -> Self {
        Self {
            bytes: blob.bytes,
            mime_type: blob.mime_type.to_string(),
            width: blob.width,
            height: blob.height,
        }
    }
}

/// Convert a u8 filter value to a smoothing filter.
///
/// Values:
/// - 1 = Bilinear (faster)
/// - anything else = Lanczos3 (best quality)
///
/// Nearest-neighbour is not offered; exports are always smoothed.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        1 => FilterType::Bilinear,
        _ => FilterType::Lanczos3,
    }
}

pub(crate) fn to_js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Best-effort message from a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_image_round_trip() {
        let js = JsDecodedImage::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(js.byte_length(), 8);
        let core = js.to_decoded();
        assert_eq!((core.width, core.height), (2, 1));
        let back = JsDecodedImage::from_decoded(core);
        assert_eq!(back.pixels(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_output_blob_from_core() {
        let blob = JsOutputBlob::from(OutputBlob {
            bytes: vec![0x89, b'P'],
            mime_type: "image/png",
            width: 3,
            height: 4,
        });
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!((blob.width(), blob.height(), blob.byte_length()), (3, 4, 2));
    }

    #[test]
    fn test_filter_from_u8() {
        assert_eq!(filter_from_u8(0), FilterType::Lanczos3);
        assert_eq!(filter_from_u8(1), FilterType::Bilinear);
        assert_eq!(filter_from_u8(2), FilterType::Lanczos3);
        assert_eq!(filter_from_u8(255), FilterType::Lanczos3);
    }
}
