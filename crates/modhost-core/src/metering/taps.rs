//! Published meter values, shared with observers.

use crate::lockfree::AtomicFloat;

/// Atomic copies of a host's meters.
///
/// Written by the audio thread at the end of each callback, read by any
/// number of observers. Layout is fixed at host construction.
#[derive(Debug)]
pub struct MeterTaps {
    inputs: Box<[AtomicFloat]>,
    outputs: Box<[AtomicFloat]>,
    midi: AtomicFloat,
    has_midi: bool,
}

impl MeterTaps {
    pub fn new(inputs: usize, outputs: usize, has_midi: bool) -> Self {
        Self {
            inputs: (0..inputs).map(|_| AtomicFloat::default()).collect(),
            outputs: (0..outputs).map(|_| AtomicFloat::default()).collect(),
            midi: AtomicFloat::default(),
            has_midi,
        }
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    #[inline]
    pub fn has_midi(&self) -> bool {
        self.has_midi
    }

    #[inline]
    pub(crate) fn publish_input(&self, channel: usize, level: f32) {
        if let Some(tap) = self.inputs.get(channel) {
            tap.set(level);
        }
    }

    #[inline]
    pub(crate) fn publish_output(&self, channel: usize, level: f32) {
        if let Some(tap) = self.outputs.get(channel) {
            tap.set(level);
        }
    }

    #[inline]
    pub(crate) fn publish_midi(&self, value: f32) {
        self.midi.set(value);
    }

    #[inline]
    pub fn input(&self, channel: usize) -> Option<f32> {
        self.inputs.get(channel).map(AtomicFloat::get)
    }

    #[inline]
    pub fn output(&self, channel: usize) -> Option<f32> {
        self.outputs.get(channel).map(AtomicFloat::get)
    }

    /// `None` when the module takes no MIDI.
    #[inline]
    pub fn midi(&self) -> Option<f32> {
        self.has_midi.then(|| self.midi.get())
    }
}
