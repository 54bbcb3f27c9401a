//! Resizer Core - Image resizing library
//!
//! This crate provides the core functionality of the image resizer: decoding
//! (with HEIC/HEIF conversion), aspect-locked target sizing, resize and
//! encode for export, preset persistence and the offline asset cache.

pub mod cache;
pub mod config;
pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod export;
pub mod preset;
pub mod session;

#[cfg(test)]
mod test_support;

pub use cache::{AssetCacheManager, CacheConfig, CacheError};
pub use config::ResizerConfig;
pub use decode::{Converter, DecodeError, DecodedImage, Decoder, SourceFile};
pub use dimensions::{DimensionLinker, Preset, TargetDimensions};
pub use encode::{EncodeError, OutputBlob, OutputSpec, RasterTransformer};
pub use export::{ExportPlan, ShareOutcome};
pub use session::{ImagePipeline, Session};
