//! Parameter hand-off integration tests
//!
//! Control-side writes through `HostHandle` / `ParameterHandle` and what the
//! module observes at block boundaries.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use modhost::prelude::*;
use modhost::Error;
use std::thread;

fn changes(host: &ProcessingHost<RecordingModule>) -> Vec<Vec<f32>> {
    host.module()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::ParamsChanged(v) => Some(v.clone()),
            _ => None,
        })
        .collect()
}

/// Init delivers the defaults once; quiet blocks deliver nothing.
#[test]
fn test_defaults_on_init() {
    let (mut host, handle) =
        ProcessingHost::new(RecordingModule::effect(), &HostConfig::default()).unwrap();
    host.init(TEST_SAMPLE_RATE).unwrap();

    assert_eq!(
        host.module().calls,
        vec![
            Call::SampleRate(TEST_SAMPLE_RATE),
            Call::Activate,
            Call::ParamsChanged(vec![1.0, 0.0]),
        ]
    );
    assert_eq!(handle.parameters().values(), vec![1.0, 0.0]);
    assert!(!handle.parameters().is_dirty());

    let mut buffers = BlockBuffers::for_host(&host);
    buffers.run(&mut host, 64, None).unwrap();
    assert_eq!(changes(&host).len(), 1);
}

/// Many writes between blocks collapse into one notification.
#[test]
fn test_writes_coalesce() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);

    handle.set_param(0, 0.2).unwrap();
    handle.set_param(1, 2.0).unwrap();
    handle.set_param(0, 0.4).unwrap();
    buffers.run(&mut host, 64, None).unwrap();
    buffers.run(&mut host, 64, None).unwrap();

    assert_eq!(changes(&host), vec![vec![0.4, 2.0]]);
}

/// A gain change takes effect from the next block on.
#[test]
fn test_gain_applies_next_block() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);
    buffers.input_mut(0).unwrap()[..32].fill(0.25);

    buffers.run(&mut host, 32, None).unwrap();
    assert!((buffers.output(0).unwrap()[0] - 0.25).abs() <= FLOAT_EPSILON);

    handle.set_param(0, 2.0).unwrap();
    buffers.run(&mut host, 32, None).unwrap();
    assert!((buffers.output(0).unwrap()[0] - 0.5).abs() <= FLOAT_EPSILON);
}

/// Writes from another thread are picked up by the audio side.
#[test]
fn test_cross_thread_writes() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);

    let writer = {
        let handle = handle.clone();
        thread::spawn(move || {
            for i in 0..100 {
                handle.set_param(0, i as f32 / 100.0).unwrap();
            }
        })
    };
    writer.join().unwrap();

    buffers.run(&mut host, 16, None).unwrap();
    assert_eq!(changes(&host), vec![vec![0.99, 0.0]]);
}

/// Whole-vector writes must match the parameter count.
#[test]
fn test_set_all_length_checked() {
    let (_host, handle) = test_host(RecordingModule::effect());

    let err = handle.set_params(&[0.5]).unwrap_err();
    assert!(matches!(err, modhost::core::Error::ParameterCount { expected: 2, got: 1 }));
    assert_eq!(handle.parameters().values(), vec![1.0, 0.0]);
    assert!(!handle.parameters().is_dirty());

    handle.set_params(&[0.5, 3.0]).unwrap();
    assert_eq!(handle.parameters().values(), vec![0.5, 3.0]);
}

#[test]
fn test_out_of_range_index() {
    let (_host, handle) = test_host(RecordingModule::effect());
    let err = handle.set_param(2, 1.0).unwrap_err();
    let err: Error = err.into();
    assert!(err.to_string().contains("index 2"));
    assert_eq!(handle.get_param(2), None);
}

/// `touch` requests a notification without changing any value.
#[test]
fn test_touch() {
    let (mut host, handle) = test_host(RecordingModule::effect());
    let mut buffers = BlockBuffers::for_host(&host);

    handle.parameters().touch();
    buffers.run(&mut host, 16, None).unwrap();
    assert_eq!(changes(&host), vec![vec![1.0, 0.0]]);
}

/// Normalized control values follow the declared ranges.
#[test]
fn test_normalized_and_lookup() {
    let (_host, handle) = test_host(RecordingModule::effect());
    let params = handle.parameters();

    let mode = params.index_of("mode").unwrap();
    params.set_normalized(mode, 0.5).unwrap();
    assert_eq!(params.get(mode), Some(2.0));

    let gain = params.index_of("gain").unwrap();
    params.set_normalized(gain, 0.25).unwrap();
    assert_eq!(params.get(gain), Some(0.5));

    assert_eq!(params.info(gain).unwrap().name, "gain");
    assert_eq!(params.index_of("missing"), None);
    assert_eq!(params.count(), 2);
}
