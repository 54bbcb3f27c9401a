//! Browser delivery of exports: Web Share with files, or an anchor download.

use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use resizer_core::encode::OutputBlob;
use resizer_core::export::{DownloadSink, ShareError, ShareTarget};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, FilePropertyBag, HtmlAnchorElement};

use crate::console;
use crate::types::js_error_message;

/// `navigator.share({ files })`, when the browser can share files.
pub struct NavigatorShare;

impl ShareTarget for NavigatorShare {
    async fn share(&self, blob: &OutputBlob, file_name: &str) -> Result<(), ShareError> {
        let navigator: JsValue = web_sys::window()
            .ok_or(ShareError::Unavailable)?
            .navigator()
            .into();
        let share = method(&navigator, "share").ok_or(ShareError::Unavailable)?;
        let can_share = method(&navigator, "canShare").ok_or(ShareError::Unavailable)?;

        let file = to_file(blob, file_name).map_err(|e| ShareError::Failed(js_error_message(&e)))?;
        let data = Object::new();
        Reflect::set(&data, &"files".into(), &Array::of1(&file))
            .and_then(|_| Reflect::set(&data, &"title".into(), &file_name.into()))
            .map_err(|e| ShareError::Failed(js_error_message(&e)))?;

        let allowed = can_share
            .call1(&navigator, &data)
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        if !allowed {
            return Err(ShareError::Unavailable);
        }

        let returned = share.call1(&navigator, &data).map_err(share_error)?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map(|_| ())
            .map_err(share_error)
    }
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &name.into())
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
}

fn share_error(e: JsValue) -> ShareError {
    let name = Reflect::get(&e, &"name".into())
        .ok()
        .and_then(|n| n.as_string());
    match name.as_deref() {
        Some("AbortError") => ShareError::Cancelled,
        _ => ShareError::Failed(js_error_message(&e)),
    }
}

fn parts(blob: &OutputBlob) -> Array {
    Array::of1(&Uint8Array::from(blob.bytes.as_slice()))
}

fn to_file(blob: &OutputBlob, file_name: &str) -> Result<File, JsValue> {
    let options = FilePropertyBag::new();
    options.set_type(blob.mime_type);
    File::new_with_u8_array_sequence_and_options(&parts(blob), file_name, &options)
}

/// Object-URL plus a synthetic click on an `<a download>`.
pub struct AnchorDownload;

impl DownloadSink for AnchorDownload {
    fn download(&self, blob: &OutputBlob, file_name: &str) {
        if let Err(e) = trigger_download(blob, file_name) {
            console::error(&format!("download of {file_name} failed: {}", js_error_message(&e)));
        }
    }
}

fn trigger_download(blob: &OutputBlob, file_name: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document to download from"))?;

    let options = BlobPropertyBag::new();
    options.set_type(blob.mime_type);
    let data = Blob::new_with_u8_array_sequence_and_options(&parts(blob), &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&data)?;

    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body to attach the download link to"))?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    web_sys::Url::revoke_object_url(&url)
}
