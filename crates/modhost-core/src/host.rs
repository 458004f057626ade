//! Per-callback orchestration of a hosted module.
//!
//! [`ProcessingHost`] lives on the audio thread. Everything an observer or
//! controller needs is reachable through the [`HostHandle`] returned next
//! to it, so the two halves never share a lock.

use crate::config::HostConfig;
use crate::metering::{LevelMeter, MeterTaps, MeteringHandle, MidiActivityMeter};
use crate::module::{dispatch_midi, ModuleIo, ProcessingModule};
use crate::parameter::{ParameterBridge, ParameterHandle};
use crate::splitter::{EventSplitter, SplitHandler};
use crate::{Error, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use modhost_midi::{MidiBuffer, RawMidiEvent};
use std::sync::Arc;

/// Width of the active-channel mask returned by `ProcessingModule::process`.
pub const MAX_OUTPUTS: usize = u32::BITS as usize;

/// Buffers the driver hands over for one callback.
///
/// Only valid for the duration of the callback; nothing is retained.
pub struct AudioBlock<'a, 'b> {
    pub inputs: &'a [&'b [f32]],
    pub outputs: &'a mut [&'b mut [f32]],
    pub midi: Option<&'a MidiBuffer>,
}

impl<'a, 'b> AudioBlock<'a, 'b> {
    pub fn new(
        inputs: &'a [&'b [f32]],
        outputs: &'a mut [&'b mut [f32]],
        midi: Option<&'a MidiBuffer>,
    ) -> Self {
        Self {
            inputs,
            outputs,
            midi,
        }
    }

    /// Frames every bound buffer can hold, capped at `nframes`.
    #[inline]
    fn frames_available(&self, nframes: usize) -> usize {
        let shortest_in = self.inputs.iter().map(|b| b.len()).min();
        let shortest_out = self.outputs.iter().map(|b| b.len()).min();
        [Some(nframes), shortest_in, shortest_out]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(nframes)
    }
}

/// A string setting sent through [`HostHandle::configure`], handed back
/// with the module's answer once the audio thread has applied it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureReply {
    pub key: String,
    pub value: String,
    /// `None` when the module accepted the setting.
    pub error: Option<String>,
}

impl ConfigureReply {
    pub fn result(&self) -> Result<()> {
        match &self.error {
            None => Ok(()),
            Some(message) => Err(Error::Configure {
                key: self.key.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// Control-plane half of a host.
#[derive(Clone)]
pub struct HostHandle {
    name: Arc<str>,
    parameters: ParameterHandle,
    metering: MeteringHandle,
    commands: Sender<u32>,
    configures: Sender<ConfigureReply>,
    configure_replies: Receiver<ConfigureReply>,
}

impl HostHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &ParameterHandle {
        &self.parameters
    }

    pub fn metering(&self) -> &MeteringHandle {
        &self.metering
    }

    pub fn get_param(&self, index: usize) -> Option<f32> {
        self.parameters.get(index)
    }

    pub fn set_param(&self, index: usize, value: f32) -> Result<()> {
        self.parameters.set(index, value)
    }

    pub fn set_params(&self, values: &[f32]) -> Result<()> {
        self.parameters.set_all(values)
    }

    /// Level of a port in flat numbering (inputs, outputs, MIDI).
    pub fn level(&self, port: usize) -> f32 {
        self.metering.level(port)
    }

    /// Queue a module command for the start of the next block.
    pub fn execute(&self, command: u32) -> Result<()> {
        self.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => Error::CommandQueueFull,
            TrySendError::Disconnected(_) => Error::HostDisconnected,
        })
    }

    /// Queue a string setting for the start of the next block.
    ///
    /// The strings are built here and come back through
    /// [`configure_replies`](Self::configure_replies), so the audio thread
    /// never allocates or frees them.
    pub fn configure(&self, key: &str, value: &str) -> Result<()> {
        let request = ConfigureReply {
            key: key.to_string(),
            value: value.to_string(),
            error: None,
        };
        self.configures.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => Error::CommandQueueFull,
            TrySendError::Disconnected(_) => Error::HostDisconnected,
        })
    }

    /// Settings applied since the last call, in the order they were sent.
    pub fn configure_replies(&self) -> Vec<ConfigureReply> {
        self.configure_replies.try_iter().collect()
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Hosts one module inside the audio callback.
///
/// Per block: flush pending parameter changes, run queued commands, split
/// the block around MIDI events, meter every channel, then let the module
/// clear its one-shot state. `process` never allocates, locks or logs.
pub struct ProcessingHost<M: ProcessingModule> {
    module: M,
    input_meters: Vec<LevelMeter>,
    output_meters: Vec<LevelMeter>,
    midi_meter: MidiActivityMeter,
    midi_window_secs: f64,
    parameters: ParameterBridge,
    commands: Receiver<u32>,
    configures: Receiver<ConfigureReply>,
    configure_replies: Sender<ConfigureReply>,
    taps: Arc<MeterTaps>,
    sample_rate: f64,
    max_block_size: usize,
    supports_midi: bool,
}

impl<M: ProcessingModule> std::fmt::Debug for ProcessingHost<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingHost")
            .field("sample_rate", &self.sample_rate)
            .field("max_block_size", &self.max_block_size)
            .field("supports_midi", &self.supports_midi)
            .finish_non_exhaustive()
    }
}

impl<M: ProcessingModule> ProcessingHost<M> {
    pub fn new(module: M, config: &HostConfig) -> Result<(Self, HostHandle)> {
        config.validate()?;

        let inputs = module.input_count();
        let outputs = module.output_count();
        if outputs > MAX_OUTPUTS {
            return Err(Error::TooManyOutputs {
                count: outputs,
                max: MAX_OUTPUTS,
            });
        }
        let supports_midi = module.supports_midi();

        let (parameters, parameter_handle) = ParameterBridge::new(module.parameters());
        let (command_tx, command_rx) = crossbeam_channel::bounded(config.command_queue_capacity);
        let (configure_tx, configure_rx) =
            crossbeam_channel::bounded(config.command_queue_capacity);
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(config.command_queue_capacity);
        let taps = Arc::new(MeterTaps::new(inputs, outputs, supports_midi));

        tracing::debug!(
            "Created host for '{}': {} in, {} out, {} params, midi={}",
            module.name(),
            inputs,
            outputs,
            parameter_handle.count(),
            supports_midi
        );

        let handle = HostHandle {
            name: Arc::from(module.name()),
            parameters: parameter_handle,
            metering: MeteringHandle::new(Arc::clone(&taps)),
            commands: command_tx,
            configures: configure_tx,
            configure_replies: reply_rx,
        };

        let host = Self {
            module,
            input_meters: vec![LevelMeter::with_falloff(config.meter_falloff); inputs],
            output_meters: vec![LevelMeter::with_falloff(config.meter_falloff); outputs],
            midi_meter: MidiActivityMeter::new(),
            midi_window_secs: config.midi_meter_window_secs,
            parameters,
            commands: command_rx,
            configures: configure_rx,
            configure_replies: reply_tx,
            taps,
            sample_rate: 0.0,
            max_block_size: config.max_block_size,
            supports_midi,
        };

        Ok((host, handle))
    }

    /// Hand the negotiated sample rate to the module and activate it.
    ///
    /// The module receives the full parameter vector once; pending changes
    /// are considered delivered.
    pub fn init(&mut self, sample_rate: f64) -> Result<()> {
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        self.sample_rate = sample_rate;
        self.module.set_sample_rate(sample_rate);
        self.module.activate();
        self.parameters.force_flush(&mut self.module);
        tracing::debug!(
            "Activated '{}' at {} Hz",
            self.module.name(),
            sample_rate
        );
        Ok(())
    }

    /// Apply a string setting directly, outside the audio callback.
    pub fn configure(&mut self, key: &str, value: &str) -> Result<()> {
        match self.module.configure(key, value) {
            None => {
                tracing::debug!("'{}' configured {} = {}", self.module.name(), key, value);
                Ok(())
            }
            Some(message) => {
                tracing::warn!("'{}' rejected {} = {}: {}", self.module.name(), key, value, message);
                Err(Error::Configure {
                    key: key.to_string(),
                    message,
                })
            }
        }
    }

    /// Current string settings of the module.
    pub fn configures(&self) -> Vec<(String, String)> {
        let mut settings = Vec::new();
        self.module.send_configures(&mut settings);
        settings
    }

    /// Process one block.
    ///
    /// `block.midi` is ignored for modules without MIDI support. Buffers
    /// shorter than `nframes` shrink the block to the shortest one. A block
    /// binding fewer channels than the module declares is rendered as
    /// silence without running the module; pending changes wait for the
    /// next complete block.
    pub fn process(&mut self, nframes: usize, block: &mut AudioBlock<'_, '_>) {
        if block.inputs.len() < self.input_meters.len()
            || block.outputs.len() < self.output_meters.len()
        {
            for output in block.outputs.iter_mut() {
                let len = nframes.min(output.len());
                output[..len].fill(0.0);
            }
            return;
        }
        let nframes = block.frames_available(nframes);
        let midi = if self.supports_midi { block.midi } else { None };

        self.parameters.flush(&mut self.module);
        while let Ok(command) = self.commands.try_recv() {
            self.module.execute(command);
        }
        while let Ok(mut request) = self.configures.try_recv() {
            request.error = self.module.configure(&request.key, &request.value);
            // Only dropped here if the control side stopped draining replies.
            let _ = self.configure_replies.try_send(request);
        }

        let mut runner = SubBlockRunner {
            module: &mut self.module,
            block,
            input_meters: &mut self.input_meters,
            output_meters: &mut self.output_meters,
            midi_meter: &mut self.midi_meter,
            sample_rate: self.sample_rate,
            midi_window_secs: self.midi_window_secs,
        };
        let splitter = EventSplitter::new(nframes);
        match midi {
            Some(buffer) => splitter.run(buffer.iter(), &mut runner),
            None => splitter.run(core::iter::empty(), &mut runner),
        };

        self.module.params_reset();
        self.publish();
    }

    fn publish(&self) {
        for (channel, meter) in self.input_meters.iter().enumerate() {
            self.taps.publish_input(channel, meter.level());
        }
        for (channel, meter) in self.output_meters.iter().enumerate() {
            self.taps.publish_output(channel, meter.level());
        }
        self.taps.publish_midi(self.midi_meter.value());
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    /// 0.0 until [`init`](Self::init) succeeds.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn input_count(&self) -> usize {
        self.input_meters.len()
    }

    pub fn output_count(&self) -> usize {
        self.output_meters.len()
    }

    pub fn supports_midi(&self) -> bool {
        self.supports_midi
    }

    pub fn input_meter(&self, channel: usize) -> Option<&LevelMeter> {
        self.input_meters.get(channel)
    }

    pub fn output_meter(&self, channel: usize) -> Option<&LevelMeter> {
        self.output_meters.get(channel)
    }

    pub fn midi_meter(&self) -> f32 {
        self.midi_meter.value()
    }

    /// Deactivate and hand back the module.
    pub fn into_module(mut self) -> M {
        self.module.deactivate();
        self.module
    }
}

/// Meters and runs the module over each range the splitter yields.
struct SubBlockRunner<'h, 'a, 'b, M> {
    module: &'h mut M,
    block: &'h mut AudioBlock<'a, 'b>,
    input_meters: &'h mut [LevelMeter],
    output_meters: &'h mut [LevelMeter],
    midi_meter: &'h mut MidiActivityMeter,
    sample_rate: f64,
    midi_window_secs: f64,
}

impl<M: ProcessingModule> SplitHandler for SubBlockRunner<'_, '_, '_, M> {
    #[inline]
    fn process_range(&mut self, offset: usize, len: usize) {
        let range = offset..offset + len;

        for (meter, input) in self.input_meters.iter_mut().zip(self.block.inputs.iter()) {
            meter.update(&input[range.clone()]);
        }

        let mask = {
            let mut io = ModuleIo::new(self.block.inputs, &mut *self.block.outputs, offset, len);
            self.module.process(&mut io)
        };

        for (channel, (meter, output)) in self
            .output_meters
            .iter_mut()
            .zip(self.block.outputs.iter_mut())
            .enumerate()
        {
            let samples = &mut output[range.clone()];
            if mask & (1u32 << channel) == 0 {
                samples.fill(0.0);
                meter.update_zeros(len);
            } else {
                meter.update(samples);
            }
        }

        self.midi_meter
            .decay(len, self.sample_rate, self.midi_window_secs);
    }

    #[inline]
    fn handle_event(&mut self, event: RawMidiEvent<'_>) {
        self.midi_meter.trigger();
        dispatch_midi(&mut *self.module, event.bytes);
    }
}
