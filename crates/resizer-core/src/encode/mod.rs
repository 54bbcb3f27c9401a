//! Image transformation and encoding for export.
//!
//! This module provides functionality for:
//! - Picking the output container from the working filename ([`OutputSpec`])
//! - Scaling a decoded raster onto the target box with smoothing
//! - Encoding to JPEG (with quality), PNG or WebP
//!
//! # Examples
//!
//! ```ignore
//! use resizer_core::encode::{OutputSpec, RasterTransformer, DEFAULT_QUALITY};
//!
//! let spec = OutputSpec::for_file_name("holiday.png", DEFAULT_QUALITY);
//! let blob = RasterTransformer::default().transform(&image, target, &spec)?;
//! println!("Encoded {} bytes of {}", blob.bytes.len(), blob.mime_type);
//! ```

mod jpeg;
mod lossless;
mod resize;
mod transformer;
mod types;

pub use jpeg::encode_jpeg;
pub use lossless::{encode_png, encode_webp};
pub use resize::resize;
pub use transformer::{OutputBlob, RasterTransformer};
pub use types::{EncodeError, OutputFormat, OutputSpec, DEFAULT_QUALITY, MAX_DIMENSION, MAX_PIXELS};

/// Reject a target box that is empty or too large to allocate.
pub(crate) fn check_target(width: u32, height: u32) -> Result<(), EncodeError> {
    let pixels = u64::from(width) * u64::from(height);
    let fits = width > 0
        && height > 0
        && width <= MAX_DIMENSION
        && height <= MAX_DIMENSION
        && pixels <= MAX_PIXELS
        && usize::try_from(pixels)
            .ok()
            .and_then(|p| p.checked_mul(4))
            .is_some();
    if fits {
        Ok(())
    } else {
        Err(EncodeError::InvalidDimensions { width, height })
    }
}

/// Check dimensions and buffer length of RGBA input.
pub(crate) fn validate_rgba(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|p| p.checked_mul(4))
        .ok_or(EncodeError::InvalidDimensions { width, height })?;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
