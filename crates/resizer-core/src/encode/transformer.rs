//! Resize-then-encode for a single export.

use tracing::debug;

use super::lossless::{encode_png, encode_webp};
use super::{check_target, encode_jpeg, resize, EncodeError, OutputFormat, OutputSpec};
use crate::decode::{DecodedImage, FilterType};
use crate::dimensions::TargetDimensions;

/// An encoded export. Each call produces a fresh blob owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBlob {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Scales a [`DecodedImage`] to the target box and encodes it.
#[derive(Debug, Clone, Copy)]
pub struct RasterTransformer {
    filter: FilterType,
}

impl Default for RasterTransformer {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl RasterTransformer {
    /// Smoothing is mandatory for export quality, so `Nearest` is refused and
    /// replaced with the default filter.
    pub fn with_filter(filter: FilterType) -> Self {
        if filter.is_smoothing() {
            Self { filter }
        } else {
            Self::default()
        }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// # Errors
    ///
    /// `EncodeError::InvalidDimensions` before any allocation when either
    /// target axis is zero or the box exceeds the export limits; `EncodeError::EncodingFailed` if the encoder fails.
    pub fn transform(
        &self,
        image: &DecodedImage,
        target: TargetDimensions,
        spec: &OutputSpec,
    ) -> Result<OutputBlob, EncodeError> {
        check_target(target.width, target.height)?;

        let surface = resize(image, target.width, target.height, self.filter)?;
        let bytes = match spec.format {
            OutputFormat::Jpeg => {
                encode_jpeg(&surface.pixels, surface.width, surface.height, spec.jpeg_quality())?
            }
            OutputFormat::Png => encode_png(&surface.pixels, surface.width, surface.height)?,
            OutputFormat::Webp => encode_webp(&surface.pixels, surface.width, surface.height)?,
        };

        debug!(
            width = target.width,
            height = target.height,
            mime = spec.mime_type(),
            bytes = bytes.len(),
            "encoded export"
        );

        Ok(OutputBlob {
            bytes,
            mime_type: spec.mime_type(),
            width: target.width,
            height: target.height,
        })
    }
}
