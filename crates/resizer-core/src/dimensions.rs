//! Width/height linkage for the resize target.
//!
//! [`DimensionLinker`] is a pure state machine. While the aspect ratio is
//! locked, whichever axis changed last is authoritative and the other axis is
//! derived from it. The rule is deliberately asymmetric: editing width then
//! height is not the same as editing height then width.
//!
//! Presets are applied through the same two handlers a user's typing goes
//! through, so the lock behaves identically for both.

use serde::{Deserialize, Serialize};

/// The original dimensions of the loaded image and the lock flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectState {
    pub original_width: u32,
    pub original_height: u32,
    /// `original_width / original_height`; fixed for the loaded image.
    pub ratio: f64,
    pub locked: bool,
}

impl AspectState {
    /// Returns `None` when either dimension is zero.
    pub fn new(original_width: u32, original_height: u32) -> Option<Self> {
        if original_width == 0 || original_height == 0 {
            return None;
        }
        let ratio = original_width as f64 / original_height as f64;
        if !ratio.is_finite() || ratio <= 0.0 {
            return None;
        }
        Some(Self {
            original_width,
            original_height,
            ratio,
            locked: true,
        })
    }

    pub fn original(&self) -> TargetDimensions {
        TargetDimensions::new(self.original_width, self.original_height)
    }
}

/// Output size in pixels. Zero means the field is empty or invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDimensions {
    pub width: u32,
    pub height: u32,
}

impl TargetDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A quick-size choice. Exactly one axis or a scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PresetRecord", into = "PresetRecord")]
pub enum Preset {
    Scale(f64),
    Width(u32),
    Height(u32),
}

impl Preset {
    /// Whether `other` is the same quick-size button, tolerating float noise
    /// in stored scale factors.
    pub fn matches(&self, other: &Preset) -> bool {
        match (self, other) {
            (Preset::Scale(a), Preset::Scale(b)) => (a - b).abs() < 1e-9,
            (Preset::Width(a), Preset::Width(b)) | (Preset::Height(a), Preset::Height(b)) => a == b,
            _ => false,
        }
    }
}

/// Stored shape of a preset: `{"scale": .., "width": .., "height": ..}` with
/// unused fields set to `null`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PresetRecord {
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

impl TryFrom<PresetRecord> for Preset {
    type Error = String;

    fn try_from(record: PresetRecord) -> Result<Self, Self::Error> {
        // Precedence matches how quick-size buttons were applied: scale, height, width.
        if let Some(scale) = record.scale.filter(|s| s.is_finite() && *s > 0.0) {
            return Ok(Preset::Scale(scale));
        }
        if let Some(height) = record.height.filter(|h| *h > 0) {
            return Ok(Preset::Height(height));
        }
        if let Some(width) = record.width.filter(|w| *w > 0) {
            return Ok(Preset::Width(width));
        }
        Err("preset has no scale, width or height".to_string())
    }
}

impl From<Preset> for PresetRecord {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Scale(scale) => PresetRecord {
                scale: Some(scale),
                ..Default::default()
            },
            Preset::Width(width) => PresetRecord {
                width: Some(width),
                ..Default::default()
            },
            Preset::Height(height) => PresetRecord {
                height: Some(height),
                ..Default::default()
            },
        }
    }
}

/// Keeps [`TargetDimensions`] consistent with [`AspectState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionLinker {
    aspect: AspectState,
    target: TargetDimensions,
}

impl DimensionLinker {
    /// Initial state for a freshly loaded image: locked, at original size.
    pub fn new(original_width: u32, original_height: u32) -> Option<Self> {
        let aspect = AspectState::new(original_width, original_height)?;
        Some(Self {
            aspect,
            target: aspect.original(),
        })
    }

    pub fn aspect(&self) -> &AspectState {
        &self.aspect
    }

    pub fn target(&self) -> TargetDimensions {
        self.target
    }

    pub fn is_locked(&self) -> bool {
        self.aspect.locked
    }

    pub fn width_changed(&mut self, width: u32) {
        self.target.width = width;
        if self.aspect.locked && width > 0 {
            self.target.height = (width as f64 / self.aspect.ratio).round() as u32;
        }
    }

    pub fn height_changed(&mut self, height: u32) {
        self.target.height = height;
        if self.aspect.locked && height > 0 {
            self.target.width = (height as f64 * self.aspect.ratio).round() as u32;
        }
    }

    /// Flip the lock. Engaging it re-derives height from the current width.
    pub fn toggle_lock(&mut self) {
        self.aspect.locked = !self.aspect.locked;
        if self.aspect.locked {
            self.width_changed(self.target.width);
        }
    }

    pub fn apply_preset(&mut self, preset: &Preset) {
        match *preset {
            Preset::Scale(scale) => {
                let width = (self.aspect.original_width as f64 * scale.max(0.0)).round() as u32;
                self.width_changed(width);
            }
            Preset::Height(height) => self.height_changed(height),
            Preset::Width(width) => self.width_changed(width),
        }
    }

    /// Back to the original size; the lock is left alone.
    pub fn reset(&mut self) {
        self.target = self.aspect.original();
    }
}
