//! Native raster decoding with EXIF orientation handling.
//!
//! "Native" is the decode path that needs no converter: the bytes are sniffed,
//! decoded by whichever codec recognises them, and rotated upright the way a
//! browser displays them.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// A decoder that turns container bytes straight into a raster.
#[allow(async_fn_in_trait)]
pub trait NativeDecoder {
    /// Decode any container this runtime understands.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;

    /// Decode a HEIC/HEIF container directly, without a converter.
    ///
    /// Support for this is platform dependent; the default refuses.
    async fn decode_heif(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let _ = bytes;
        Err(DecodeError::DecodeFailed(
            "no native HEIF decoder on this platform".to_string(),
        ))
    }
}

/// Pure Rust decoder backed by the `image` crate (JPEG, PNG, WebP).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl NativeDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        decode_oriented(bytes)
    }

    async fn decode_heif(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        // Succeeds only if a registered codec happens to recognise the container.
        decode_oriented(bytes)
    }
}

/// Decode image bytes of any supported format, applying EXIF orientation.
///
/// # Errors
///
/// Returns `DecodeError::DecodeFailed` for empty input, unrecognised content,
/// corrupted data, or a decode that yields a zero-sized raster.
pub fn decode_oriented(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::DecodeFailed("file is empty".to_string()));
    }

    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::DecodeFailed(
            "content is not a recognised image".to_string(),
        ));
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;

    let oriented = apply_orientation(img, orientation).into_rgba8();
    if oriented.width() == 0 || oriented.height() == 0 {
        return Err(DecodeError::DecodeFailed(
            "image has zero width or height".to_string(),
        ));
    }

    Ok(DecodedImage::from_rgba_image(oriented))
}

/// Extract EXIF orientation, defaulting to `Normal` when absent or unreadable.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jpeg_bytes, png_bytes};

    #[test]
    fn test_decode_jpeg() {
        let img = decode_oriented(&jpeg_bytes(30, 20)).unwrap();
        assert_eq!((img.width, img.height), (30, 20));
        assert_eq!(img.pixels.len(), 30 * 20 * 4);
    }

    #[test]
    fn test_decode_png_keeps_alpha_channel() {
        let img = decode_oriented(&png_bytes(8, 4)).unwrap();
        assert_eq!((img.width, img.height), (8, 4));
        assert_eq!(img.pixels.len(), 8 * 4 * 4);
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(
            decode_oriented(&[]),
            Err(DecodeError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_decode_text_content() {
        let result = decode_oriented(b"just some notes, not a photo");
        assert!(matches!(result, Err(DecodeError::DecodeFailed(_))));
    }

    #[test]
    fn test_decode_truncated_jpeg() {
        let bytes = jpeg_bytes(16, 16);
        let result = decode_oriented(&bytes[..24]);
        assert!(matches!(result, Err(DecodeError::DecodeFailed(_))));
    }

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(extract_orientation(&jpeg_bytes(4, 4)), Orientation::Normal);
        assert_eq!(extract_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90_swaps_dimensions() {
        let rgb = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let rotated = apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::Rotate90CW);
        assert_eq!((rotated.width(), rotated.height()), (1, 2));
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let rgb = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let flipped = apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::FlipHorizontal)
            .into_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(flipped.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[tokio::test]
    async fn test_heif_fallback_rejects_heif_container() {
        // ftyp box of a HEIC file; no bundled codec understands it.
        let heic = b"\x00\x00\x00\x18ftypheic\x00\x00\x00\x00mif1heic";
        let result = ImageCrateDecoder.decode_heif(heic).await;
        assert!(matches!(result, Err(DecodeError::DecodeFailed(_))));
    }
}
