//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::io::Cursor;

use image::{ImageFormat, RgbImage, RgbaImage};

use crate::decode::{DecodedImage, SourceFile};
use crate::preset::{PresetStore, StoreError};

/// Gradient RGB image so resampling has something to smooth.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            128,
        ])
    })
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgba = RgbaImage::from_fn(width, height, |x, _| {
        image::Rgba([200, 10, 10, (x % 256) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn decoded(width: u32, height: u32) -> DecodedImage {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for px in gradient(width, height).pixels() {
        pixels.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
    DecodedImage::new(width, height, pixels)
}

pub fn jpeg_file(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(jpeg_bytes(width, height), "image/jpeg", name)
}

/// Decode encoder output back to its pixel dimensions.
pub fn dimensions_of(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

/// Preset store backed by a map; `failing` makes every write error.
#[derive(Debug, Default)]
pub struct MapStore {
    pub values: HashMap<String, String>,
    pub failing: bool,
}

impl PresetStore for MapStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
