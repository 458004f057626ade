//! Metering integration tests
//!
//! Level meters per channel and the MIDI activity meter, read back through
//! the `MeteringHandle` an observer thread would hold.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use approx::assert_relative_eq;
use modhost::prelude::*;
use modhost::LevelMeter;

const FALLOFF: f64 = 0.999;

fn fill(buffers: &mut BlockBuffers, channel: usize, value: f32, nframes: usize) {
    buffers.input_mut(channel).unwrap()[..nframes].fill(value);
}

/// Ports are numbered inputs first, then outputs, then MIDI.
#[test]
fn test_flat_port_numbering() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);
    fill(&mut buffers, 0, 0.8, 64);
    fill(&mut buffers, 1, -0.3, 64);

    buffers.run(&mut host, 64, None).unwrap();

    let meters = handle.metering();
    assert_relative_eq!(meters.level(0), 0.8, epsilon = METER_EPSILON);
    assert_relative_eq!(meters.level(1), 0.3, epsilon = METER_EPSILON);
    assert_relative_eq!(meters.level(2), 0.8, epsilon = METER_EPSILON);
    assert_relative_eq!(meters.level(3), 0.3, epsilon = METER_EPSILON);
    // No MIDI port on an effect, and nothing beyond it.
    assert_eq!(meters.level(4), 0.0);
    assert_eq!(meters.level(99), 0.0);
    assert_eq!(meters.port_count(), 4);
    assert_eq!(meters.input_levels().len(), 2);
    assert_eq!(meters.output_levels().len(), 2);
}

/// The MIDI meter sits right after the outputs for MIDI-capable modules.
#[test]
fn test_midi_port_index() {
    let (mut host, handle) = test_host(RecordingModule::instrument());
    let mut buffers = BlockBuffers::for_host(&host);
    let events = midi(&[(0, &[0x90, 60, 100])]);

    buffers.run(&mut host, 48, Some(&events)).unwrap();

    let expected = (1.0 - 48.0 / (0.1 * TEST_SAMPLE_RATE)) as f32;
    assert_relative_eq!(handle.level(2), expected, epsilon = METER_EPSILON);
    assert_eq!(handle.metering().port_count(), 3);
}

/// Silence after a peak decays by `falloff` per sample.
#[test]
fn test_level_decays_through_silence() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);
    fill(&mut buffers, 0, 1.0, 1);
    buffers.run(&mut host, 1, None).unwrap();
    fill(&mut buffers, 0, 0.0, TEST_BUFFER_SIZE);
    buffers.run(&mut host, TEST_BUFFER_SIZE, None).unwrap();

    let expected = FALLOFF.powi(TEST_BUFFER_SIZE as i32) as f32;
    assert_relative_eq!(handle.metering().input_level(0), expected, max_relative = 1e-4);
    assert_relative_eq!(handle.metering().output_level(0), expected, max_relative = 1e-4);
}

/// A full-scale peak followed by ~0.2 s of silence reads as silent.
#[test]
fn test_level_reaches_silence() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);
    fill(&mut buffers, 0, 1.0, 1);
    buffers.run(&mut host, 1, None).unwrap();
    fill(&mut buffers, 0, 0.0, TEST_BUFFER_SIZE);

    buffers.run(&mut host, TEST_BUFFER_SIZE, None).unwrap();
    assert!(handle.metering().output_level(0) > SILENCE_THRESHOLD);

    for _ in 1..20 {
        buffers.run(&mut host, TEST_BUFFER_SIZE, None).unwrap();
    }
    assert!(handle.metering().input_level(0) < SILENCE_THRESHOLD);
    assert!(handle.metering().output_level(0) < SILENCE_THRESHOLD);
    assert_silence(&buffers.output(0).unwrap()[..TEST_BUFFER_SIZE], SILENCE_THRESHOLD);
}

/// Masked-off channels decay exactly like channels fed real zeros.
#[test]
fn test_masked_decay_matches_zero_input() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);
    fill(&mut buffers, 0, 0.9, 32);
    fill(&mut buffers, 1, 0.9, 32);
    buffers.run(&mut host, 32, None).unwrap();

    // Output 0 goes inactive, output 1 keeps copying a silent input.
    host.module_mut().mask = 0b10;
    fill(&mut buffers, 0, 0.7, 256);
    fill(&mut buffers, 1, 0.0, 256);
    buffers.run(&mut host, 256, None).unwrap();

    let masked = handle.metering().output_level(0);
    let zeros = handle.metering().output_level(1);
    assert_relative_eq!(masked, zeros, max_relative = 1e-4);
    assert_silence(&buffers.output(0).unwrap()[..256], 0.0);
}

/// The MIDI meter falls linearly and bottoms out at zero.
#[test]
fn test_midi_meter_decay() {
    let (mut host, handle) = test_host(RecordingModule::instrument());
    let mut buffers = BlockBuffers::for_host(&host);
    let events = midi(&[(0, &[0xB0, 1, 64])]);

    buffers.run(&mut host, TEST_BUFFER_SIZE, Some(&events)).unwrap();
    let first = handle.metering().midi_activity();
    buffers.run(&mut host, TEST_BUFFER_SIZE, None).unwrap();
    let second = handle.metering().midi_activity();

    let step = (TEST_BUFFER_SIZE as f64 / (0.1 * TEST_SAMPLE_RATE)) as f32;
    assert_relative_eq!(first, 1.0 - step, epsilon = METER_EPSILON);
    assert_relative_eq!(second, 1.0 - 2.0 * step, epsilon = METER_EPSILON);

    // 0.1 s at 48 kHz is 4800 frames.
    for _ in 0..10 {
        buffers.run(&mut host, TEST_BUFFER_SIZE, None).unwrap();
    }
    assert_eq!(handle.metering().midi_activity(), 0.0);
}

/// Sub-threshold and non-finite samples never leave residue in a meter.
#[test]
fn test_meter_flushes_denormals() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);
    fill(&mut buffers, 0, 1e-9, 64);
    buffers.run(&mut host, 64, None).unwrap();
    assert_eq!(handle.metering().input_level(0), 0.0);

    fill(&mut buffers, 0, f32::NAN, 64);
    buffers.run(&mut host, 64, None).unwrap();
    assert!(handle.metering().input_level(0).is_finite());
}

/// Audio-thread meters and published telemetry agree after every block.
#[test]
fn test_published_levels_match_meters() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);
    let sine = generate_sine(1000.0, TEST_SAMPLE_RATE, 128);

    for _ in 0..4 {
        buffers.input_mut(0).unwrap()[..128].copy_from_slice(&sine);
        buffers.run(&mut host, 128, None).unwrap();
        assert_eq!(
            handle.metering().input_level(0),
            host.input_meter(0).map(LevelMeter::level).unwrap()
        );
        assert_eq!(
            handle.metering().output_level(0),
            host.output_meter(0).map(LevelMeter::level).unwrap()
        );
    }
}

/// A custom falloff from the config reaches every meter.
#[test]
fn test_configured_falloff() {
    let config = HostConfig {
        meter_falloff: 0.5,
        ..Default::default()
    };
    let (mut host, handle) = ProcessingHost::new(RecordingModule::effect(), &config).unwrap();
    host.init(TEST_SAMPLE_RATE).unwrap();
    let mut buffers = BlockBuffers::for_host(&host);
    buffers.input_mut(0).unwrap()[..3].copy_from_slice(&[1.0, 0.0, 0.0]);

    buffers.run(&mut host, 3, None).unwrap();
    assert_relative_eq!(handle.metering().input_level(0), 0.25, epsilon = FLOAT_EPSILON);
}
