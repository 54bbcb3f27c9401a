//! Scaling a decoded raster onto the target box.
//!
//! The whole source is drawn into exactly `width x height`; nothing is cropped
//! or letterboxed, so an unlocked aspect ratio distorts on purpose.

use super::{check_target, EncodeError};
use crate::decode::{DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` if either target dimension is zero
/// or the target exceeds [`MAX_DIMENSION`](super::MAX_DIMENSION) or
/// [`MAX_PIXELS`](super::MAX_PIXELS), and `EncodeError::InvalidPixelData` if
/// the source buffer does not match its declared size.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, EncodeError> {
    check_target(width, height)?;

    let source = image.as_rgba_image().ok_or(EncodeError::InvalidPixelData {
        expected: (image.width as usize) * (image.height as usize) * 4,
        actual: image.pixels.len(),
    })?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let resized = image::imageops::resize(&source, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgba_image(resized))
}
