//! HEIC/HEIF conversion capability.
//!
//! Conversion is backed by an optional capability that may have failed to
//! load. Which variant is in play is settled once, at startup, by picking
//! [`Converter::Available`] or [`Converter::Unavailable`]; the decoder never
//! checks for it again.

use super::ConvertError;

/// Default JPEG quality for converted HEIC/HEIF files.
pub const CONVERSION_QUALITY: f32 = 0.92;

/// What a converter should produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionTarget {
    pub mime_type: &'static str,
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for ConversionTarget {
    fn default() -> Self {
        Self {
            mime_type: "image/jpeg",
            quality: CONVERSION_QUALITY,
        }
    }
}

/// Converts a container the native decoder cannot read into one it can.
#[allow(async_fn_in_trait)]
pub trait FormatConverter {
    async fn convert(&self, blob: &[u8], target: ConversionTarget) -> Result<Vec<u8>, ConvertError>;
}

/// Placeholder backing for [`Converter::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConverter;

impl FormatConverter for NoConverter {
    async fn convert(
        &self,
        _blob: &[u8],
        _target: ConversionTarget,
    ) -> Result<Vec<u8>, ConvertError> {
        Err(ConvertError::Unavailable)
    }
}

/// The conversion capability as detected at startup.
#[derive(Debug, Clone, Default)]
pub enum Converter<C = NoConverter> {
    Available(C),
    #[default]
    Unavailable,
}

impl<C: FormatConverter> Converter<C> {
    /// Select a variant from an optional capability.
    pub fn detect(capability: Option<C>) -> Self {
        match capability {
            Some(converter) => Converter::Available(converter),
            None => Converter::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Converter::Available(_))
    }

    /// Run the conversion. `Unavailable` short-circuits without a call.
    pub async fn convert(
        &self,
        blob: &[u8],
        target: ConversionTarget,
    ) -> Result<Vec<u8>, ConvertError> {
        match self {
            Converter::Available(converter) => converter.convert(blob, target).await,
            Converter::Unavailable => Err(ConvertError::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingConverter {
        calls: Cell<u32>,
    }

    impl FormatConverter for CountingConverter {
        async fn convert(
            &self,
            blob: &[u8],
            _target: ConversionTarget,
        ) -> Result<Vec<u8>, ConvertError> {
            self.calls.set(self.calls.get() + 1);
            Ok(blob.to_vec())
        }
    }

    #[tokio::test]
    async fn test_unavailable_short_circuits() {
        let converter: Converter<CountingConverter> = Converter::detect(None);
        assert!(!converter.is_available());

        let result = converter.convert(b"heic", ConversionTarget::default()).await;
        assert_eq!(result, Err(ConvertError::Unavailable));
    }

    #[tokio::test]
    async fn test_available_delegates() {
        let converter = Converter::detect(Some(CountingConverter { calls: Cell::new(0) }));
        assert!(converter.is_available());

        let out = converter
            .convert(b"heic", ConversionTarget::default())
            .await
            .unwrap();
        assert_eq!(out, b"heic");
        if let Converter::Available(inner) = &converter {
            assert_eq!(inner.calls.get(), 1);
        }
    }

    #[test]
    fn test_default_target_is_jpeg() {
        let target = ConversionTarget::default();
        assert_eq!(target.mime_type, "image/jpeg");
        assert!((target.quality - 0.92).abs() < f32::EPSILON);
    }
}
