//! JavaScript-backed decode capabilities.
//!
//! Both are optional functions handed to the session at construction:
//!
//! - a HEIC/HEIF converter `(bytes, mimeType, quality) => Promise<Uint8Array | Blob | Blob[]>`,
//!   typically a thin wrapper over a library such as heic2any
//! - a native HEIF decoder `(bytes) => Promise<ImageData>` for browsers that
//!   can draw HEIC themselves

use js_sys::{Array, ArrayBuffer, Function, Promise, Uint8Array};
use resizer_core::decode::{
    decode_oriented, ConversionTarget, ConvertError, DecodeError, DecodedImage, FormatConverter,
    NativeDecoder,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, ImageData};

use crate::types::js_error_message;

pub struct JsHeicConverter {
    convert: Function,
}

impl JsHeicConverter {
    pub fn new(convert: Function) -> Self {
        Self { convert }
    }
}

impl FormatConverter for JsHeicConverter {
    async fn convert(
        &self,
        blob: &[u8],
        target: ConversionTarget,
    ) -> Result<Vec<u8>, ConvertError> {
        let returned = self
            .convert
            .call3(
                &JsValue::NULL,
                &Uint8Array::from(blob),
                &JsValue::from_str(target.mime_type),
                &JsValue::from_f64(f64::from(target.quality)),
            )
            .map_err(|e| ConvertError::Failed(js_error_message(&e)))?;
        let value = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| ConvertError::Failed(js_error_message(&e)))?;
        converted_bytes(value).await
    }
}

/// Accepts bytes, a `Blob`, or an array whose first element is either.
async fn converted_bytes(value: JsValue) -> Result<Vec<u8>, ConvertError> {
    let value = if Array::is_array(&value) {
        Array::from(&value).get(0)
    } else {
        value
    };

    if let Some(blob) = value.dyn_ref::<Blob>() {
        let buffer = JsFuture::from(blob.array_buffer())
            .await
            .map_err(|e| ConvertError::Failed(js_error_message(&e)))?;
        return Ok(Uint8Array::new(&buffer).to_vec());
    }
    if value.is_instance_of::<Uint8Array>() || value.is_instance_of::<ArrayBuffer>() {
        return Ok(Uint8Array::new(&value).to_vec());
    }
    Err(ConvertError::Failed(
        "converter returned neither bytes nor a Blob".to_string(),
    ))
}

/// `image`-crate decoding plus an optional browser HEIF path.
pub struct BrowserDecoder {
    native_heif: Option<Function>,
}

impl BrowserDecoder {
    pub fn new(native_heif: Option<Function>) -> Self {
        Self { native_heif }
    }
}

impl NativeDecoder for BrowserDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        decode_oriented(bytes)
    }

    async fn decode_heif(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let Some(decode) = &self.native_heif else {
            return Err(DecodeError::DecodeFailed(
                "browser has no native HEIF decoder".to_string(),
            ));
        };
        let returned = decode
            .call1(&JsValue::NULL, &Uint8Array::from(bytes))
            .map_err(|e| DecodeError::DecodeFailed(js_error_message(&e)))?;
        let value = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| DecodeError::DecodeFailed(js_error_message(&e)))?;
        let data: ImageData = value.dyn_into().map_err(|_| {
            DecodeError::DecodeFailed("native HEIF decode did not return ImageData".to_string())
        })?;

        let (width, height) = (data.width(), data.height());
        let pixels = data.data().0;
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize * 4 {
            return Err(DecodeError::DecodeFailed(format!(
                "native HEIF decode returned a {width}x{height} image with {} bytes",
                pixels.len()
            )));
        }
        Ok(DecodedImage::new(width, height, pixels))
    }
}
