//! Test helpers and fixtures for modhost integration tests.
//!
//! [`RecordingModule`] logs every call the host makes into it, so tests can
//! assert the exact order of sub-blocks, MIDI callbacks and parameter
//! notifications.

#![allow(dead_code)]

pub mod tolerances;

use modhost::prelude::*;
use modhost::ParameterScale;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard buffer size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 512;

/// One callback into a [`RecordingModule`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SampleRate(f64),
    Activate,
    Deactivate,
    ParamsChanged(Vec<f32>),
    Process { offset: usize, len: usize },
    NoteOn(u8, u8),
    NoteOff(u8, u8),
    ProgramChange(u8),
    ControlChange(u8, u8),
    PitchBend(i32),
    ParamsReset,
    Execute(u32),
    Configure(String, String),
}

/// Mock module with a configurable layout.
///
/// Each output copies input `ch % inputs` scaled by parameter 0 ("gain"),
/// or writes `dc * gain` when there are no inputs. `process` reports `mask`.
pub struct RecordingModule {
    pub inputs: usize,
    pub outputs: usize,
    pub midi: bool,
    pub mask: u32,
    pub dc: f32,
    pub gain: f32,
    pub calls: Vec<Call>,
    /// Accepted string settings; an empty value is rejected.
    pub settings: Vec<(String, String)>,
}

impl RecordingModule {
    pub fn new(inputs: usize, outputs: usize, midi: bool) -> Self {
        Self {
            inputs,
            outputs,
            midi,
            mask: u32::MAX,
            dc: 0.5,
            gain: 1.0,
            calls: Vec::new(),
            settings: Vec::new(),
        }
    }

    /// Stereo instrument: no inputs, two outputs, MIDI.
    pub fn instrument() -> Self {
        Self::new(0, 2, true)
    }

    /// Stereo effect: two inputs, two outputs, no MIDI.
    pub fn effect() -> Self {
        Self::new(2, 2, false)
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_dc(mut self, dc: f32) -> Self {
        self.dc = dc;
        self
    }

    pub fn process_ranges(&self) -> Vec<(usize, usize)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Process { offset, len } => Some((*offset, *len)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl ProcessingModule for RecordingModule {
    fn name(&self) -> &str {
        "recorder"
    }

    fn input_count(&self) -> usize {
        self.inputs
    }

    fn output_count(&self) -> usize {
        self.outputs
    }

    fn supports_midi(&self) -> bool {
        self.midi
    }

    fn parameters(&self) -> Vec<ParameterInfo> {
        vec![
            ParameterInfo::new("gain", ParameterRange::linear(0.0, 2.0, 1.0)),
            ParameterInfo::new(
                "mode",
                ParameterRange::new(0.0, 3.0, 0.0, ParameterScale::Integer),
            ),
        ]
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.calls.push(Call::SampleRate(sample_rate));
    }

    fn activate(&mut self) {
        self.calls.push(Call::Activate);
    }

    fn deactivate(&mut self) {
        self.calls.push(Call::Deactivate);
    }

    fn params_changed(&mut self, params: &[f32]) {
        self.gain = params[0];
        self.calls.push(Call::ParamsChanged(params.to_vec()));
    }

    fn process(&mut self, io: &mut ModuleIo<'_, '_>) -> u32 {
        self.calls.push(Call::Process {
            offset: io.offset(),
            len: io.len(),
        });
        for ch in 0..io.output_count() {
            if self.inputs > 0 {
                let gain = self.gain;
                let (input, output) = io.io(ch % self.inputs, ch);
                for (o, i) in output.iter_mut().zip(input) {
                    *o = i * gain;
                }
            } else {
                io.output(ch).fill(self.dc * self.gain);
            }
        }
        self.mask
    }

    fn note_on(&mut self, note: u8, velocity: u8) {
        self.calls.push(Call::NoteOn(note, velocity));
    }

    fn note_off(&mut self, note: u8, velocity: u8) {
        self.calls.push(Call::NoteOff(note, velocity));
    }

    fn program_change(&mut self, program: u8) {
        self.calls.push(Call::ProgramChange(program));
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        self.calls.push(Call::ControlChange(controller, value));
    }

    fn pitch_bend(&mut self, value: i32) {
        self.calls.push(Call::PitchBend(value));
    }

    fn params_reset(&mut self) {
        self.calls.push(Call::ParamsReset);
    }

    fn execute(&mut self, command: u32) {
        self.calls.push(Call::Execute(command));
    }

    fn configure(&mut self, key: &str, value: &str) -> Option<String> {
        self.calls
            .push(Call::Configure(key.to_string(), value.to_string()));
        if value.is_empty() {
            return Some(format!("no value for '{}'", key));
        }
        match self.settings.iter_mut().find(|(k, _)| k == key) {
            Some(setting) => setting.1 = value.to_string(),
            None => self.settings.push((key.to_string(), value.to_string())),
        }
        None
    }

    fn send_configures(&self, sink: &mut dyn ConfigureSink) {
        for (key, value) in &self.settings {
            sink.send_configure(key, value);
        }
    }
}

/// Create and initialise a host at [`TEST_SAMPLE_RATE`], with the init
/// calls cleared from the log.
pub fn test_host(module: RecordingModule) -> (ProcessingHost<RecordingModule>, HostHandle) {
    let (mut host, handle) =
        ProcessingHost::new(module, &HostConfig::default()).expect("Failed to create test host");
    host.init(TEST_SAMPLE_RATE).expect("Failed to init test host");
    host.module_mut().calls.clear();
    (host, handle)
}

/// Build a MIDI buffer from `(time, bytes)` pairs.
pub fn midi(events: &[(u32, &[u8])]) -> MidiBuffer {
    let mut buffer = MidiBuffer::with_capacity(events.len().max(1));
    for &(time, bytes) in events {
        buffer.push(time, bytes).expect("Failed to push MIDI event");
    }
    buffer
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Generate an impulse signal (single sample at 1.0, rest zeros).
pub fn generate_impulse(num_samples: usize, position: usize) -> Vec<f32> {
    let mut samples = vec![0.0; num_samples];
    if position < num_samples {
        samples[position] = 1.0;
    }
    samples
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}
