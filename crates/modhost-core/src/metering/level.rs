//! Exponential peak-decay envelope follower.

use crate::config::DEFAULT_METER_FALLOFF;

/// Levels below this are flushed to zero (2^-24, one LSB of a 24-bit sample).
pub const METER_FLOOR: f32 = 1.0 / 16_777_216.0;

/// Decaying peak meter.
///
/// Each sample either raises the level to its magnitude or lets it decay by
/// `falloff`. The level is always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelMeter {
    level: f32,
    falloff: f32,
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelMeter {
    pub fn new() -> Self {
        Self::with_falloff(DEFAULT_METER_FALLOFF)
    }

    /// `falloff` must lie in (0, 1); checked by `HostConfig::validate`.
    pub fn with_falloff(falloff: f32) -> Self {
        debug_assert!(falloff > 0.0 && falloff < 1.0);
        Self {
            level: 0.0,
            falloff,
        }
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn falloff(&self) -> f32 {
        self.falloff
    }

    #[inline]
    pub fn reset(&mut self) {
        self.level = 0.0;
    }

    /// Run the envelope over `samples`.
    #[inline]
    pub fn update(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }
        let falloff = self.falloff as f64;
        let mut tmp = self.level as f64;
        for &sample in samples {
            tmp = (tmp * falloff).max(sample.abs() as f64);
        }
        self.level = sanitize(tmp);
    }

    /// Same result as `update` over `len` zero samples, in closed form.
    #[inline]
    pub fn update_zeros(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let decay = (self.falloff as f64).powf(len as f64);
        self.level = sanitize(self.level as f64 * decay);
    }
}

#[inline]
fn sanitize(value: f64) -> f32 {
    let value = value as f32;
    if !value.is_finite() || value.abs() < METER_FLOOR {
        0.0
    } else {
        value
    }
}
