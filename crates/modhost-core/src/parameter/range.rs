//! Declared parameter metadata.
//!
//! Values flow through the host unnormalized. The range is used for
//! defaults and for mapping normalized (0.0-1.0) control input.
//!
//! ```
//! use modhost_core::{ParameterInfo, ParameterRange};
//!
//! let cutoff = ParameterInfo::new("cutoff", ParameterRange::logarithmic(20.0, 20000.0, 1000.0));
//! let hz = cutoff.range.denormalize(0.5); // ~632 Hz
//! assert!((hz - 632.45).abs() < 0.1);
//! ```

use serde::{Deserialize, Serialize};

/// How a normalized control value maps onto the real range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ParameterScale {
    #[default]
    Linear,
    /// `real = min * (max/min)^normalized`, requires `min > 0`.
    Logarithmic,
    /// Below 0.5 is `min`, otherwise `max`.
    Toggle,
    /// Rounded to whole numbers.
    Integer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub scale: ParameterScale,
}

impl ParameterRange {
    /// `default` is clamped into `[min, max]`.
    pub fn new(min: f32, max: f32, default: f32, scale: ParameterScale) -> Self {
        debug_assert!(max > min, "max must be greater than min");
        Self {
            min,
            max,
            default: default.clamp(min, max),
            scale,
        }
    }

    pub fn linear(min: f32, max: f32, default: f32) -> Self {
        Self::new(min, max, default, ParameterScale::Linear)
    }

    pub fn logarithmic(min: f32, max: f32, default: f32) -> Self {
        debug_assert!(min > 0.0, "logarithmic scale requires min > 0");
        Self::new(min, max, default, ParameterScale::Logarithmic)
    }

    pub fn toggle(default_on: bool) -> Self {
        Self::new(
            0.0,
            1.0,
            if default_on { 1.0 } else { 0.0 },
            ParameterScale::Toggle,
        )
    }

    pub fn integer(min: i32, max: i32, default: i32) -> Self {
        Self::new(
            min as f32,
            max as f32,
            default as f32,
            ParameterScale::Integer,
        )
    }

    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        let value = value.clamp(self.min, self.max);
        match self.scale {
            ParameterScale::Logarithmic if self.min > 0.0 => {
                (value / self.min).ln() / (self.max / self.min).ln()
            }
            ParameterScale::Toggle => {
                if value >= (self.min + self.max) * 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParameterScale::Integer => (value.round() - self.min) / span,
            _ => (value - self.min) / span,
        }
    }

    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        let span = self.max - self.min;
        match self.scale {
            ParameterScale::Logarithmic if self.min > 0.0 => {
                self.min * (self.max / self.min).powf(normalized)
            }
            ParameterScale::Toggle => {
                if normalized >= 0.5 {
                    self.max
                } else {
                    self.min
                }
            }
            ParameterScale::Integer => (self.min + normalized * span).round(),
            _ => self.min + normalized * span,
        }
    }
}

impl Default for ParameterRange {
    fn default() -> Self {
        Self::linear(0.0, 1.0, 0.5)
    }
}

/// A parameter as declared by a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub range: ParameterRange,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, range: ParameterRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    #[inline]
    pub fn default_value(&self) -> f32 {
        self.range.default
    }
}
