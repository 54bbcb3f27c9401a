//! The cascading decode strategy.
//!
//! ```text
//! HEIC/HEIF ──► converter ──ok──► native decode ──ok──► ready
//!                  │                  │
//!                  └──fail/unavail────┴──► native HEIF decode ──fail──► UnsupportedFormat
//!
//! other ─────────────────────────► native decode ──fail──► DecodeFailed
//! ```
//!
//! Every failure is terminal for the call; nothing is retried.

use tracing::{debug, info, warn};

use super::convert::{ConversionTarget, Converter, FormatConverter, NoConverter};
use super::native::{ImageCrateDecoder, NativeDecoder};
use super::source::heif_name_as_jpeg;
use super::{ConvertError, DecodeError, DecodedImage, SourceFile};

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub image: DecodedImage,
    /// Filename the rest of the session should use; HEIC/HEIF sources are
    /// renamed to `.jpg`.
    pub file_name: String,
}

/// Turns a [`SourceFile`] into a [`DecodedImage`], choosing the strategy by
/// file classification.
#[derive(Debug, Clone, Default)]
pub struct Decoder<C = NoConverter, N = ImageCrateDecoder> {
    converter: Converter<C>,
    native: N,
    target: ConversionTarget,
}

impl<C: FormatConverter> Decoder<C, ImageCrateDecoder> {
    pub fn new(converter: Converter<C>) -> Self {
        Self::with_native(converter, ImageCrateDecoder)
    }
}

impl<C: FormatConverter, N: NativeDecoder> Decoder<C, N> {
    pub fn with_native(converter: Converter<C>, native: N) -> Self {
        Self {
            converter,
            native,
            target: ConversionTarget::default(),
        }
    }

    /// Override what HEIC/HEIF files are converted into.
    pub fn with_conversion_target(mut self, target: ConversionTarget) -> Self {
        self.target = target;
        self
    }

    pub fn converter(&self) -> &Converter<C> {
        &self.converter
    }

    /// Decode one file.
    ///
    /// # Errors
    ///
    /// - `DecodeError::UnsupportedFormat` for HEIC/HEIF input when conversion
    ///   and the native HEIF fallback both fail.
    /// - `DecodeError::DecodeFailed` for any other undecodable input.
    pub async fn decode(&self, file: &SourceFile) -> Result<Decoded, DecodeError> {
        if file.is_heif() {
            return self.decode_heif(file).await;
        }

        let image = self.native.decode(file.bytes()).inspect_err(|e| {
            warn!(file = file.name(), error = %e, "decode failed");
        })?;
        debug!(file = file.name(), width = image.width, height = image.height, "decoded");

        Ok(Decoded {
            image,
            file_name: file.name().to_string(),
        })
    }

    async fn decode_heif(&self, file: &SourceFile) -> Result<Decoded, DecodeError> {
        let file_name = heif_name_as_jpeg(file.name());

        match self.converter.convert(file.bytes(), self.target).await {
            Ok(converted) => match self.native.decode(&converted) {
                Ok(image) => {
                    debug!(file = %file_name, "decoded converted HEIF");
                    return Ok(Decoded { image, file_name });
                }
                Err(e) => warn!(file = file.name(), error = %e, "converted HEIF did not decode"),
            },
            Err(ConvertError::Unavailable) => {
                info!(file = file.name(), "HEIF conversion unavailable, trying native decode");
            }
            Err(e) => warn!(file = file.name(), error = %e, "HEIF conversion failed"),
        }

        match self.native.decode_heif(file.bytes()).await {
            Ok(image) => {
                debug!(file = %file_name, "decoded HEIF natively");
                Ok(Decoded { image, file_name })
            }
            Err(e) => {
                warn!(file = file.name(), error = %e, "native HEIF decode failed");
                Err(DecodeError::unsupported_heif())
            }
        }
    }
}
