//! Image acquisition for the resizer.
//!
//! This module provides functionality for:
//! - Classifying a selected file (HEIC/HEIF or a natively decodable format)
//! - Converting HEIC/HEIF through an optional [`FormatConverter`] capability
//! - Falling back to a platform's own HEIF decode when conversion fails
//! - Decoding JPEG, PNG and WebP with EXIF orientation applied
//!
//! # Architecture
//!
//! [`Decoder`] owns the cascade. The converter is chosen once at startup as
//! [`Converter::Available`] or [`Converter::Unavailable`], and the native
//! decoder is a [`NativeDecoder`] so hosts with their own codecs (a browser,
//! for instance) can plug in a HEIF path.
//!
//! # Examples
//!
//! ```ignore
//! use resizer_core::decode::{Converter, Decoder, NoConverter, SourceFile};
//!
//! let decoder = Decoder::new(Converter::<NoConverter>::Unavailable);
//! let file = SourceFile::new(std::fs::read("photo.jpg")?, "image/jpeg", "photo.jpg");
//! let decoded = decoder.decode(&file).await?;
//! println!("Decoded {}x{} image", decoded.image.width, decoded.image.height);
//! ```

mod convert;
mod decoder;
mod native;
mod source;
mod types;

pub use convert::{
    ConversionTarget, Converter, FormatConverter, NoConverter, CONVERSION_QUALITY,
};
pub use decoder::{Decoded, Decoder};
pub use native::{decode_oriented, ImageCrateDecoder, NativeDecoder};
pub use source::{heif_name_as_jpeg, SourceFile, FALLBACK_FILE_NAME};
pub(crate) use source::extension_of;
pub use types::{
    ConvertError, DecodeError, DecodedImage, FilterType, Orientation, HEIF_REMEDIATION,
};
