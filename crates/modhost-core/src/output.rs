//! CPAL output adapter (feature `cpal`).
//!
//! Drives a [`ProcessingHost`] from the default output device. The device
//! buffer is rendered in chunks of at most `max_block_size` frames through
//! [`BlockBuffers`] and interleaved into the device format. Live MIDI comes
//! in through a lock-free ring buffer and lands at offset 0 of the next
//! callback.

use crate::buffers::BlockBuffers;
use crate::host::ProcessingHost;
use crate::module::ProcessingModule;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use modhost_midi::MidiBuffer;
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};

/// Default capacity of the live MIDI queue, in messages.
pub const DEFAULT_LIVE_MIDI_CAPACITY: usize = 256;

/// Wrapper to hold a `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` due to platform internals. The stream is
/// created, kept and dropped by the owning [`CpalOutput`] and never
/// touched from another thread.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

// SAFETY: see above; the handle is only ever dropped, never used.
unsafe impl Send for StreamHandle {}

/// Sends short MIDI messages to a running [`CpalOutput`].
pub struct LiveMidiSender {
    producer: HeapProd<[u8; 3]>,
}

impl LiveMidiSender {
    /// Queue a raw 3-byte message. Returns false if the queue is full.
    #[inline]
    pub fn send(&mut self, message: [u8; 3]) -> bool {
        self.producer.try_push(message).is_ok()
    }

    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) -> bool {
        self.send([0x90 | (channel & 0x0F), note, velocity])
    }

    pub fn note_off(&mut self, channel: u8, note: u8, velocity: u8) -> bool {
        self.send([0x80 | (channel & 0x0F), note, velocity])
    }

    pub fn control_change(&mut self, channel: u8, controller: u8, value: u8) -> bool {
        self.send([0xB0 | (channel & 0x0F), controller, value])
    }
}

/// Output stream on the default device.
pub struct CpalOutput {
    sample_rate: f64,
    channels: usize,
    is_running: bool,
    _stream: Option<StreamHandle>,
}

impl CpalOutput {
    pub fn new() -> Result<Self> {
        let device = default_device()?;
        let config = device.default_output_config()?;

        Ok(Self {
            sample_rate: config.sample_rate().0 as f64,
            channels: config.channels() as usize,
            is_running: false,
            _stream: None,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Initialise `host` at the device rate and start streaming it.
    pub fn start<M>(&mut self, mut host: ProcessingHost<M>, midi_capacity: usize) -> Result<LiveMidiSender>
    where
        M: ProcessingModule + 'static,
    {
        if self.is_running {
            return Err(Error::InvalidConfig("Output stream already running".into()));
        }

        let device = default_device()?;
        let config = device.default_output_config()?;
        host.init(self.sample_rate)?;

        let (producer, consumer) = HeapRb::<[u8; 3]>::new(midi_capacity.max(1)).split();
        let state = StreamState {
            buffers: BlockBuffers::for_host(&host),
            midi: MidiBuffer::with_capacity(midi_capacity.max(1)),
            scratch: vec![0.0; host.max_block_size() * self.channels],
            host,
            live_midi: consumer,
        };

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32, M>(&device, &config.into(), state)?,
            cpal::SampleFormat::I16 => build_stream::<i16, M>(&device, &config.into(), state)?,
            cpal::SampleFormat::U16 => build_stream::<u16, M>(&device, &config.into(), state)?,
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };

        stream.play()?;
        self._stream = Some(StreamHandle(stream));
        self.is_running = true;
        tracing::info!(
            "Output stream started: {} Hz, {} channels",
            self.sample_rate,
            self.channels
        );

        Ok(LiveMidiSender { producer })
    }

    /// Drop the stream and the host it was running.
    pub fn stop(&mut self) {
        if self._stream.take().is_some() {
            tracing::info!("Output stream stopped");
        }
        self.is_running = false;
    }
}

/// Everything the device callback owns.
struct StreamState<M: ProcessingModule> {
    host: ProcessingHost<M>,
    buffers: BlockBuffers,
    midi: MidiBuffer,
    scratch: Vec<f32>,
    live_midi: HeapCons<[u8; 3]>,
}

impl<M: ProcessingModule> StreamState<M> {
    fn render<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let frames = data.len() / channels;
        let chunk = self.buffers.max_frames().max(1);

        self.midi.clear();
        while let Some(message) = self.live_midi.try_pop() {
            if self.midi.push(0, &message).is_err() {
                break;
            }
        }

        let mut done = 0;
        while done < frames {
            let n = (frames - done).min(chunk);
            if self.buffers.run(&mut self.host, n, Some(&self.midi)).is_err() {
                silence(&mut data[done * channels..]);
                return;
            }
            self.midi.clear();

            let samples = n * channels;
            self.buffers.write_interleaved(n, channels, &mut self.scratch[..samples]);
            for (out, &sample) in data[done * channels..done * channels + samples]
                .iter_mut()
                .zip(&self.scratch[..samples])
            {
                *out = T::from_sample(sample);
            }
            done += n;
        }
    }
}

fn default_device() -> Result<cpal::Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or(Error::NoOutputDevice)
}

fn build_stream<T, M>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut state: StreamState<M>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
    M: ProcessingModule + 'static,
{
    let channels = (config.channels as usize).max(1);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                state.render(data, channels);
            }));
            if result.is_err() {
                silence(data);
            }
        },
        |_err| {
            // Stream errors surface on the device thread; nothing to do here.
        },
        None,
    )?;

    Ok(stream)
}

fn silence<T: cpal::SizedSample + cpal::FromSample<f32>>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::from_sample(0.0);
    }
}
