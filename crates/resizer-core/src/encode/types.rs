//! Output format selection and encode errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::extension_of;

/// Encoder quality used for lossy output.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Longest side an export may have.
pub const MAX_DIMENSION: u32 = 16_384;

/// Largest export area; 50 megapixels is 200 MB of RGBA.
pub const MAX_PIXELS: u64 = 50_000_000;

/// Errors that can occur while resizing or encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Width or height is zero, or the box exceeds the export limits
    #[error("Invalid dimensions: {width}x{height} is empty or too large to export")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The encoder rejected the raster
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Container formats the resizer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// `png` and `webp` keep their format; everything else becomes JPEG.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some("png") => OutputFormat::Png,
            Some("webp") => OutputFormat::Webp,
            _ => OutputFormat::Jpeg,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
        }
    }

    /// Extension used for exported files.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

/// Target container and quality for an export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub format: OutputFormat,
    /// Quality in `0.0..=1.0`; ignored by lossless encoders.
    pub quality: f32,
}

impl OutputSpec {
    /// Derive output settings from the working filename's extension.
    pub fn for_file_name(file_name: &str, quality: f32) -> Self {
        let ext = extension_of(file_name);
        Self {
            format: OutputFormat::from_extension(ext.as_deref()),
            quality,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Quality on the 1-100 scale JPEG encoders take.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
    }
}
