//! MIDI activity indicator.

/// Flashes to 1.0 on every dispatched event and falls linearly to 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MidiActivityMeter {
    value: f32,
}

impl MidiActivityMeter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn trigger(&mut self) {
        self.value = 1.0;
    }

    /// Decay by `len` samples, reaching zero after `window_secs` seconds.
    #[inline]
    pub fn decay(&mut self, len: usize, sample_rate: f64, window_secs: f64) {
        let step = len as f64 / (window_secs * sample_rate);
        let next = self.value as f64 - step;
        self.value = if next > 0.0 { next as f32 } else { 0.0 };
    }
}
