//! Read-only metering API for observers.

use super::MeterTaps;
use std::sync::Arc;

/// Polling handle for a host's meters.
///
/// # Example
/// ```ignore
/// let meters = handle.metering();
/// let peak_out_l = meters.output_level(0);
/// let midi = meters.midi_activity();
/// ```
#[derive(Debug, Clone)]
pub struct MeteringHandle {
    taps: Arc<MeterTaps>,
}

impl MeteringHandle {
    pub fn new(taps: Arc<MeterTaps>) -> Self {
        Self { taps }
    }

    /// Level of a port in flat numbering: inputs first, then outputs, then
    /// the MIDI port. Unknown ports read as 0.0.
    pub fn level(&self, port: usize) -> f32 {
        let inputs = self.taps.input_count();
        let outputs = self.taps.output_count();
        if port < inputs {
            return self.taps.input(port).unwrap_or(0.0);
        }
        let port = port - inputs;
        if port < outputs {
            return self.taps.output(port).unwrap_or(0.0);
        }
        if port == outputs {
            return self.taps.midi().unwrap_or(0.0);
        }
        0.0
    }

    pub fn input_level(&self, channel: usize) -> f32 {
        self.taps.input(channel).unwrap_or(0.0)
    }

    pub fn output_level(&self, channel: usize) -> f32 {
        self.taps.output(channel).unwrap_or(0.0)
    }

    pub fn input_levels(&self) -> Vec<f32> {
        (0..self.taps.input_count())
            .map(|ch| self.input_level(ch))
            .collect()
    }

    pub fn output_levels(&self) -> Vec<f32> {
        (0..self.taps.output_count())
            .map(|ch| self.output_level(ch))
            .collect()
    }

    /// 0.0 for modules without MIDI input.
    pub fn midi_activity(&self) -> f32 {
        self.taps.midi().unwrap_or(0.0)
    }

    /// Number of addressable ports for [`level`](Self::level).
    pub fn port_count(&self) -> usize {
        self.taps.input_count() + self.taps.output_count() + usize::from(self.taps.has_midi())
    }

    pub fn inner(&self) -> &Arc<MeterTaps> {
        &self.taps
    }
}
