//! The processing module capability a host drives.
//!
//! A module is an opaque synth or effect. The host binds its channel
//! buffers, feeds it sub-blocks between MIDI events and forwards
//! control changes through the entry points below.

use crate::parameter::ParameterInfo;
use modhost_midi::MidiMessage;

/// Synthesis/effects unit hosted inside the audio callback.
///
/// Everything except the metadata methods and `set_sample_rate`/`activate`
/// is called on the audio thread and must not allocate or block.
///
/// # Example
///
/// ```ignore
/// struct Gain { gain: f32 }
///
/// impl ProcessingModule for Gain {
///     fn name(&self) -> &str { "gain" }
///     fn input_count(&self) -> usize { 1 }
///     fn output_count(&self) -> usize { 1 }
///     fn parameters(&self) -> Vec<ParameterInfo> {
///         vec![ParameterInfo::new("gain", ParameterRange::linear(0.0, 2.0, 1.0))]
///     }
///     fn set_sample_rate(&mut self, _sample_rate: f64) {}
///     fn params_changed(&mut self, params: &[f32]) { self.gain = params[0]; }
///     fn process(&mut self, io: &mut ModuleIo<'_, '_>) -> u32 {
///         let (input, output) = io.io(0, 0);
///         for (o, i) in output.iter_mut().zip(input) { *o = i * self.gain; }
///         0b1
///     }
/// }
/// ```
pub trait ProcessingModule: Send {
    fn name(&self) -> &str;

    fn input_count(&self) -> usize;

    /// At most 32, one bit each in the mask returned by [`process`](Self::process).
    fn output_count(&self) -> usize;

    fn supports_midi(&self) -> bool {
        false
    }

    /// Declared parameters, queried once when the host is created.
    fn parameters(&self) -> Vec<ParameterInfo> {
        Vec::new()
    }

    fn set_sample_rate(&mut self, sample_rate: f64);

    fn activate(&mut self) {}

    fn deactivate(&mut self) {}

    /// Called at a block boundary with the complete parameter vector.
    fn params_changed(&mut self, _params: &[f32]) {}

    /// Process `io.len()` frames starting at `io.offset()`.
    ///
    /// Returns a bitmask of output channels that carry signal. The host
    /// zeroes the range of every channel whose bit is clear.
    fn process(&mut self, io: &mut ModuleIo<'_, '_>) -> u32;

    fn note_on(&mut self, _note: u8, _velocity: u8) {}

    fn note_off(&mut self, _note: u8, _velocity: u8) {}

    fn program_change(&mut self, _program: u8) {}

    fn control_change(&mut self, _controller: u8, _value: u8) {}

    /// Signed bend around center, `0` = no bend.
    fn pitch_bend(&mut self, _value: i32) {}

    /// End of block; clear one-shot state.
    fn params_reset(&mut self) {}

    /// Module-defined command, delivered at the start of a block.
    fn execute(&mut self, _command: u32) {}

    /// Apply a string-valued setting (a preset name, a file path).
    ///
    /// Returns `None` when accepted, otherwise the reason it was rejected.
    /// Settings queued through a `HostHandle` arrive at a block boundary on
    /// the audio thread; only a rejection may allocate there.
    fn configure(&mut self, _key: &str, _value: &str) -> Option<String> {
        None
    }

    /// Report every current string setting to `sink`.
    fn send_configures(&self, _sink: &mut dyn ConfigureSink) {}
}

/// Receives the settings a module reports from `send_configures`.
pub trait ConfigureSink {
    fn send_configure(&mut self, key: &str, value: &str);
}

impl ConfigureSink for Vec<(String, String)> {
    fn send_configure(&mut self, key: &str, value: &str) {
        self.push((key.to_string(), value.to_string()));
    }
}

/// Route raw MIDI bytes to the matching module entry point.
///
/// Unmapped status bytes are ignored.
#[inline]
pub fn dispatch_midi<M: ProcessingModule + ?Sized>(module: &mut M, bytes: &[u8]) {
    match MidiMessage::decode(bytes) {
        Some(MidiMessage::NoteOff { note, velocity }) => module.note_off(note, velocity),
        Some(MidiMessage::NoteOn { note, velocity }) => module.note_on(note, velocity),
        Some(MidiMessage::ProgramChange { program }) => module.program_change(program),
        Some(MidiMessage::ControlChange { controller, value }) => {
            module.control_change(controller, value)
        }
        Some(MidiMessage::PitchBend { value }) => module.pitch_bend(value),
        None => {}
    }
}

/// Channel buffers as seen by a module for one sub-block.
///
/// Slices returned by `input`/`output` cover only the current sub-block.
pub struct ModuleIo<'a, 'b> {
    inputs: &'a [&'b [f32]],
    outputs: &'a mut [&'b mut [f32]],
    offset: usize,
    len: usize,
}

impl<'a, 'b> ModuleIo<'a, 'b> {
    pub fn new(
        inputs: &'a [&'b [f32]],
        outputs: &'a mut [&'b mut [f32]],
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            inputs,
            outputs,
            offset,
            len,
        }
    }

    /// Sample offset of this sub-block within the callback's block.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
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
    pub fn input(&self, channel: usize) -> &[f32] {
        &self.inputs[channel][self.offset..self.offset + self.len]
    }

    #[inline]
    pub fn output(&mut self, channel: usize) -> &mut [f32] {
        &mut self.outputs[channel][self.offset..self.offset + self.len]
    }

    /// An input and an output channel at once, for in-to-out processing.
    #[inline]
    pub fn io(&mut self, input: usize, output: usize) -> (&[f32], &mut [f32]) {
        let range = self.offset..self.offset + self.len;
        (
            &self.inputs[input][range.clone()],
            &mut self.outputs[output][range],
        )
    }
}
