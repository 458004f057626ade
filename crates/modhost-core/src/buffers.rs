//! Host-owned channel storage for drivers that don't hand out per-port
//! buffers (offline rendering, interleaved device callbacks, tests).

use crate::host::{AudioBlock, ProcessingHost};
use crate::module::ProcessingModule;
use crate::{Error, Result};
use modhost_midi::MidiBuffer;
use smallvec::SmallVec;

/// Channel views are kept inline up to this many channels.
const INLINE_CHANNELS: usize = 16;

/// Pre-allocated per-channel buffers, `max_frames` long each.
///
/// All allocation happens in the constructor; [`run`](Self::run) is
/// allocation-free for up to 16 channels per direction.
#[derive(Debug, Clone)]
pub struct BlockBuffers {
    inputs: Vec<Vec<f32>>,
    outputs: Vec<Vec<f32>>,
    max_frames: usize,
}

impl BlockBuffers {
    pub fn new(inputs: usize, outputs: usize, max_frames: usize) -> Self {
        Self {
            inputs: vec![vec![0.0; max_frames]; inputs],
            outputs: vec![vec![0.0; max_frames]; outputs],
            max_frames,
        }
    }

    /// Buffers matching the host's channel layout and block limit.
    pub fn for_host<M: ProcessingModule>(host: &ProcessingHost<M>) -> Self {
        Self::new(host.input_count(), host.output_count(), host.max_block_size())
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Writable input channel, for the driver to fill before `run`.
    pub fn input_mut(&mut self, channel: usize) -> Option<&mut [f32]> {
        self.inputs.get_mut(channel).map(Vec::as_mut_slice)
    }

    /// Output channel as left by the last `run`.
    pub fn output(&self, channel: usize) -> Option<&[f32]> {
        self.outputs.get(channel).map(Vec::as_slice)
    }

    /// Zero every input channel.
    pub fn clear_inputs(&mut self) {
        for channel in &mut self.inputs {
            channel.fill(0.0);
        }
    }

    /// Run one block of `nframes` through `host`.
    pub fn run<M: ProcessingModule>(
        &mut self,
        host: &mut ProcessingHost<M>,
        nframes: usize,
        midi: Option<&MidiBuffer>,
    ) -> Result<()> {
        if nframes > self.max_frames {
            return Err(Error::BlockTooLarge {
                frames: nframes,
                max: self.max_frames,
            });
        }
        if self.inputs.len() < host.input_count() || self.outputs.len() < host.output_count() {
            return Err(Error::InvalidConfig(format!(
                "Buffers have {}/{} channels, host needs {}/{}",
                self.inputs.len(),
                self.outputs.len(),
                host.input_count(),
                host.output_count()
            )));
        }

        let inputs: SmallVec<[&[f32]; INLINE_CHANNELS]> =
            self.inputs.iter().map(|b| &b[..nframes]).collect();
        let mut outputs: SmallVec<[&mut [f32]; INLINE_CHANNELS]> =
            self.outputs.iter_mut().map(|b| &mut b[..nframes]).collect();

        let mut block = AudioBlock::new(&inputs, &mut outputs, midi);
        host.process(nframes, &mut block);
        Ok(())
    }

    /// Copy `nframes` of output into an interleaved buffer of `channels`
    /// channels. Extra device channels get silence; extra module outputs
    /// are dropped.
    pub fn write_interleaved(&self, nframes: usize, channels: usize, dest: &mut [f32]) {
        let nframes = nframes.min(self.max_frames);
        for (frame, out) in dest.chunks_mut(channels).take(nframes).enumerate() {
            for (ch, sample) in out.iter_mut().enumerate() {
                *sample = self.outputs.get(ch).map_or(0.0, |b| b[frame]);
            }
        }
    }
}
