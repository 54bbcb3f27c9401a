//! The editing session and the pipeline that drives it.
//!
//! [`Session`] holds everything that used to be ambient state: the loaded
//! image, its working filename, the dimension linker, the last-used preset
//! and a busy flag. [`ImagePipeline`] owns the stateless machinery (decoder
//! and transformer) and operates on a session passed to it.
//!
//! Loading is split into [`Session::begin_load`] and [`Session::finish_load`]
//! so hosts that cannot hold a mutable borrow across an `await` can still
//! serialise loads. A new image only replaces the old one after it decoded.

use tracing::{debug, warn};

use crate::config::ResizerConfig;
use crate::decode::{
    DecodeError, Decoded, DecodedImage, Decoder, FormatConverter, NativeDecoder, SourceFile,
};
use crate::dimensions::{DimensionLinker, Preset, TargetDimensions};
use crate::encode::{EncodeError, OutputBlob, OutputSpec, RasterTransformer};
use crate::export::{export_file_name, suggested_basename, ExportPlan};
use crate::preset::{load_preset, save_preset, PresetStore};

/// An image that decoded successfully, with its sizing state.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub image: DecodedImage,
    pub file_name: String,
    pub linker: DimensionLinker,
}

/// Proof that a load was started; hand it back to [`Session::finish_load`].
#[derive(Debug)]
#[must_use = "a started load must be finished to clear the busy state"]
pub struct LoadTicket {
    _private: (),
}

/// Original and target size, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReport {
    pub original: TargetDimensions,
    pub target: TargetDimensions,
}

pub struct Session<S> {
    config: ResizerConfig,
    store: S,
    current: Option<LoadedImage>,
    last_preset: Option<Preset>,
    busy: bool,
}

impl<S: PresetStore> Session<S> {
    /// Start a session, restoring the last-used preset from `store`.
    pub fn new(config: ResizerConfig, store: S) -> Self {
        let last_preset = load_preset(&store, &config.preset_storage_key);
        Self {
            config,
            store,
            current: None,
            last_preset,
            busy: false,
        }
    }

    pub fn config(&self) -> &ResizerConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&LoadedImage> {
        self.current.as_ref()
    }

    pub fn last_preset(&self) -> Option<Preset> {
        self.last_preset
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark a load as in flight.
    ///
    /// # Errors
    ///
    /// `DecodeError::Busy` if a previous load has not finished.
    pub fn begin_load(&mut self) -> Result<LoadTicket, DecodeError> {
        if self.busy {
            return Err(DecodeError::Busy);
        }
        self.busy = true;
        Ok(LoadTicket { _private: () })
    }

    /// Install a decode result. On error the previous image stays as it was.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Decoded, DecodeError>,
    ) -> Result<&LoadedImage, DecodeError> {
        let LoadTicket { _private: () } = ticket;
        self.busy = false;

        let decoded = result?;
        let mut linker = DimensionLinker::new(decoded.image.width, decoded.image.height)
            .ok_or_else(|| {
                DecodeError::DecodeFailed("image has zero width or height".to_string())
            })?;
        if let Some(preset) = self.last_preset {
            linker.apply_preset(&preset);
        }

        debug!(file = %decoded.file_name, "image installed");
        Ok(self.current.insert(LoadedImage {
            image: decoded.image,
            file_name: decoded.file_name,
            linker,
        }))
    }

    pub fn set_width(&mut self, width: u32) {
        if let Some(loaded) = self.current.as_mut() {
            loaded.linker.width_changed(width);
        }
    }

    pub fn set_height(&mut self, height: u32) {
        if let Some(loaded) = self.current.as_mut() {
            loaded.linker.height_changed(height);
        }
    }

    pub fn toggle_lock(&mut self) {
        if let Some(loaded) = self.current.as_mut() {
            loaded.linker.toggle_lock();
        }
    }

    pub fn reset_size(&mut self) {
        if let Some(loaded) = self.current.as_mut() {
            loaded.linker.reset();
        }
    }

    /// A quick-size button: remember the preset, then apply it.
    pub fn apply_quick_preset(&mut self, preset: Preset) {
        self.last_preset = Some(preset);
        save_preset(&mut self.store, &self.config.preset_storage_key, &preset);
        if let Some(loaded) = self.current.as_mut() {
            loaded.linker.apply_preset(&preset);
        }
    }

    pub fn size_report(&self) -> Option<SizeReport> {
        self.current.as_ref().map(|loaded| SizeReport {
            original: loaded.linker.aspect().original(),
            target: loaded.linker.target(),
        })
    }

    /// Settle export dimensions and output format.
    ///
    /// An empty axis falls back to the original size.
    ///
    /// # Errors
    ///
    /// `EncodeError::InvalidDimensions` when no image is loaded.
    pub fn export_plan(&self) -> Result<ExportPlan, EncodeError> {
        let loaded = self
            .current
            .as_ref()
            .ok_or(EncodeError::InvalidDimensions { width: 0, height: 0 })?;

        let original = loaded.linker.aspect().original();
        let requested = loaded.linker.target();
        let target = TargetDimensions::new(
            if requested.width == 0 { original.width } else { requested.width },
            if requested.height == 0 { original.height } else { requested.height },
        );

        Ok(ExportPlan {
            target,
            spec: OutputSpec::for_file_name(&loaded.file_name, self.config.quality),
            suggested_basename: suggested_basename(&loaded.file_name, target),
        })
    }

    /// Final filename for a basename typed into the export dialog.
    pub fn export_file_name(&self, basename: &str) -> Result<String, EncodeError> {
        let plan = self.export_plan()?;
        Ok(export_file_name(basename, &self.config.default_basename, &plan.spec))
    }

    /// Forget the loaded image. The preset survives.
    pub fn reset_to_upload(&mut self) {
        self.current = None;
    }
}

/// Decoder and transformer, shared by every load and export of a session.
pub struct ImagePipeline<C, N> {
    decoder: Decoder<C, N>,
    transformer: RasterTransformer,
}

impl<C: FormatConverter, N: NativeDecoder> ImagePipeline<C, N> {
    pub fn new(decoder: Decoder<C, N>, transformer: RasterTransformer) -> Self {
        Self {
            decoder,
            transformer,
        }
    }

    pub fn decoder(&self) -> &Decoder<C, N> {
        &self.decoder
    }

    /// Decode `file` and install it into `session`.
    pub async fn load<'s, S: PresetStore>(
        &self,
        session: &'s mut Session<S>,
        file: SourceFile,
    ) -> Result<&'s LoadedImage, DecodeError> {
        let ticket = session.begin_load()?;
        let result = self.decoder.decode(&file).await;
        if let Err(e) = &result {
            warn!(file = file.name(), error = %e, "load rejected");
        }
        session.finish_load(ticket, result)
    }

    /// Resize and encode the session's image per its export plan.
    pub fn render<S: PresetStore>(&self, session: &Session<S>) -> Result<OutputBlob, EncodeError> {
        let plan = session.export_plan()?;
        let loaded = session
            .current()
            .ok_or(EncodeError::InvalidDimensions { width: 0, height: 0 })?;
        self.transformer.transform(&loaded.image, plan.target, &plan.spec)
    }
}
