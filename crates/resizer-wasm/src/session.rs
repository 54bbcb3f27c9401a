//! The stateful resizer exposed to the page.
//!
//! # Example
//!
//! ```typescript
//! import { ResizerSession } from '@image-resizer/wasm';
//!
//! const session = new ResizerSession({}, heicToJpeg, nativeHeicDecode);
//! await session.load(new Uint8Array(await file.arrayBuffer()), file.type, file.name);
//! session.apply_preset({ scale: 0.5 });
//! const mailto = await session.share(session.suggested_basename());
//! if (mailto) window.location.href = mailto;
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Promise};
use resizer_core::config::ResizerConfig;
use resizer_core::decode::{ConversionTarget, Converter, Decoder, SourceFile};
use resizer_core::dimensions::Preset;
use resizer_core::encode::RasterTransformer;
use resizer_core::export::{share_or_fallback, DownloadSink, ShareOutcome};
use resizer_core::session::{ImagePipeline, Session, SizeReport};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::console;
use crate::converter::{BrowserDecoder, JsHeicConverter};
use crate::export::{AnchorDownload, NavigatorShare};
use crate::storage::LocalStoragePresets;
use crate::types::{to_js_error, JsOutputBlob};

type BrowserPipeline = ImagePipeline<JsHeicConverter, BrowserDecoder>;

#[wasm_bindgen]
pub struct ResizerSession {
    pipeline: Rc<BrowserPipeline>,
    session: Rc<RefCell<Session<LocalStoragePresets>>>,
}

#[wasm_bindgen]
impl ResizerSession {
    /// `config` may be `undefined`. Either function may be omitted; without
    /// both, HEIC/HEIF files are reported as unsupported.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        heic_converter: Option<Function>,
        native_heif: Option<Function>,
    ) -> Result<ResizerSession, JsValue> {
        let config: ResizerConfig = if config.is_undefined() || config.is_null() {
            ResizerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };

        let converter = Converter::detect(heic_converter.map(JsHeicConverter::new));
        if !converter.is_available() {
            console::warn("HEIC converter not loaded; HEIC/HEIF relies on native support");
        }
        let decoder = Decoder::with_native(converter, BrowserDecoder::new(native_heif))
            .with_conversion_target(ConversionTarget {
                quality: config.quality,
                ..ConversionTarget::default()
            });
        let pipeline = ImagePipeline::new(decoder, RasterTransformer::default());

        Ok(ResizerSession {
            pipeline: Rc::new(pipeline),
            session: Rc::new(RefCell::new(Session::new(
                config,
                LocalStoragePresets::from_window(),
            ))),
        })
    }

    /// Decode a picked or dropped file. Resolves to the working filename.
    ///
    /// Rejects with the HEIC remediation text when a HEIC/HEIF file cannot
    /// be opened; the previously loaded image, if any, stays in place.
    pub fn load(&self, bytes: Vec<u8>, mime_type: String, name: String) -> Promise {
        let pipeline = Rc::clone(&self.pipeline);
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let ticket = session.borrow_mut().begin_load().map_err(to_js_error)?;
            let file = SourceFile::new(bytes, mime_type, name);
            let result = pipeline.decoder().decode(&file).await;
            if let Err(e) = &result {
                console::warn(&format!("could not load {}: {e}", file.name()));
            }
            let mut session = session.borrow_mut();
            let loaded = session.finish_load(ticket, result).map_err(to_js_error)?;
            Ok(JsValue::from_str(&loaded.file_name))
        })
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.session.borrow().current().is_some()
    }

    #[wasm_bindgen(getter)]
    pub fn is_busy(&self) -> bool {
        self.session.borrow().is_busy()
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> Option<String> {
        self.session
            .borrow()
            .current()
            .map(|loaded| loaded.file_name.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn original_width(&self) -> u32 {
        self.report(|r| r.original.width)
    }

    #[wasm_bindgen(getter)]
    pub fn original_height(&self) -> u32 {
        self.report(|r| r.original.height)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.report(|r| r.target.width)
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.report(|r| r.target.height)
    }

    #[wasm_bindgen(getter)]
    pub fn locked(&self) -> bool {
        self.session
            .borrow()
            .current()
            .is_some_and(|loaded| loaded.linker.is_locked())
    }

    pub fn set_width(&self, width: u32) {
        self.session.borrow_mut().set_width(width);
    }

    pub fn set_height(&self, height: u32) {
        self.session.borrow_mut().set_height(height);
    }

    pub fn toggle_lock(&self) {
        self.session.borrow_mut().toggle_lock();
    }

    pub fn reset_size(&self) {
        self.session.borrow_mut().reset_size();
    }

    /// Apply and remember `{ scale }`, `{ width }` or `{ height }`.
    pub fn apply_preset(&self, preset: JsValue) -> Result<(), JsValue> {
        let preset: Preset = serde_wasm_bindgen::from_value(preset).map_err(to_js_error)?;
        self.session.borrow_mut().apply_quick_preset(preset);
        Ok(())
    }

    /// The remembered preset in its stored shape, or `null`.
    pub fn last_preset(&self) -> Result<JsValue, JsValue> {
        match self.session.borrow().last_preset() {
            Some(preset) => preset
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(to_js_error),
            None => Ok(JsValue::NULL),
        }
    }

    /// Whether `preset` is the remembered one, for highlighting its button.
    pub fn is_last_preset(&self, preset: JsValue) -> bool {
        let Ok(preset) = serde_wasm_bindgen::from_value::<Preset>(preset) else {
            return false;
        };
        self.session
            .borrow()
            .last_preset()
            .is_some_and(|last| last.matches(&preset))
    }

    /// `{stem}_{width}x{height}` for the export dialog.
    pub fn suggested_basename(&self) -> Result<String, JsValue> {
        self.session
            .borrow()
            .export_plan()
            .map(|plan| plan.suggested_basename)
            .map_err(to_js_error)
    }

    pub fn export_file_name(&self, basename: &str) -> Result<String, JsValue> {
        self.session
            .borrow()
            .export_file_name(basename)
            .map_err(to_js_error)
    }

    /// Resize and encode the loaded image at the current target size.
    pub fn render(&self) -> Result<JsOutputBlob, JsValue> {
        let session = self.session.borrow();
        self.pipeline
            .render(&*session)
            .map(JsOutputBlob::from)
            .map_err(to_js_error)
    }

    /// Render and save. Returns the filename used.
    pub fn download(&self, basename: &str) -> Result<String, JsValue> {
        let session = self.session.borrow();
        let file_name = session.export_file_name(basename).map_err(to_js_error)?;
        let blob = self.pipeline.render(&*session).map_err(to_js_error)?;
        AnchorDownload.download(&blob, &file_name);
        Ok(file_name)
    }

    /// Render and share natively. Resolves to `null` when shared, or to a
    /// `mailto:` link after falling back to a download.
    pub fn share(&self, basename: &str) -> Promise {
        let rendered = {
            let session = self.session.borrow();
            session.export_file_name(basename).and_then(|file_name| {
                self.pipeline
                    .render(&*session)
                    .map(|blob| (blob, file_name))
            })
        };
        future_to_promise(async move {
            let (blob, file_name) = rendered.map_err(to_js_error)?;
            match share_or_fallback(&NavigatorShare, &AnchorDownload, &blob, &file_name).await {
                ShareOutcome::Shared => Ok(JsValue::NULL),
                ShareOutcome::Downloaded { mailto } => Ok(JsValue::from_str(&mailto)),
            }
        })
    }

    /// Drop the loaded image and go back to the picker. The preset stays.
    pub fn reset_to_upload(&self) {
        self.session.borrow_mut().reset_to_upload();
    }
}

impl ResizerSession {
    fn report(&self, pick: impl Fn(&SizeReport) -> u32) -> u32 {
        self.session.borrow().size_report().as_ref().map_or(0, pick)
    }
}

/// WASM-specific tests that require a browser.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::encode::resize_and_encode;
    use crate::types::JsDecodedImage;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = JsDecodedImage::new(width, height, vec![90u8; (width * height * 4) as usize]);
        resize_and_encode(&image, width, height, "x.png", 0.92, 2)
            .unwrap()
            .bytes()
    }

    #[wasm_bindgen_test]
    async fn test_load_and_render() {
        let session = ResizerSession::new(JsValue::UNDEFINED, None, None).unwrap();
        let loading = session.load(png_bytes(30, 20), "image/png".into(), "a.png".into());
        let name = JsFuture::from(loading).await.unwrap();
        assert_eq!(name.as_string().as_deref(), Some("a.png"));
        assert_eq!((session.original_width(), session.original_height()), (30, 20));

        session.set_width(15);
        assert_eq!(session.height(), 10);
        assert_eq!(session.suggested_basename().unwrap(), "a_15x10");

        let blob = session.render().unwrap();
        assert_eq!(blob.mime_type(), "image/png");
        assert_eq!((blob.width(), blob.height()), (15, 10));
    }

    #[wasm_bindgen_test]
    async fn test_heif_without_capabilities_is_unsupported() {
        let session = ResizerSession::new(JsValue::UNDEFINED, None, None).unwrap();
        let loading = session.load(vec![0, 0, 0, 24], "image/heic".into(), "p.heic".into());
        let err = JsFuture::from(loading).await.unwrap_err();
        assert!(err.as_string().unwrap_or_default().contains("Save as JPEG"));
        assert!(!session.has_image());
    }

    #[wasm_bindgen_test]
    fn test_preset_requires_known_shape() {
        let session = ResizerSession::new(JsValue::UNDEFINED, None, None).unwrap();
        assert!(session.apply_preset(JsValue::from_str("big")).is_err());
    }
}
