//! Builder for configuring and constructing a `HostClient`.

use crate::{HostClient, Result};
use modhost_core::{AudioDriver, HostConfig};

/// Every host opened on the client shares this configuration.
///
/// # Example
///
/// ```ignore
/// use modhost::prelude::*;
///
/// let client = HostClient::builder()
///     .meter_falloff(0.995)
///     .port_templates("in_%d", "out_%d", "midi_in_%d")
///     .build(OfflineDriver::new("calf", 44_100.0))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostClientBuilder {
    config: HostConfig,
}

impl HostClientBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 0.999
    pub fn meter_falloff(mut self, falloff: f32) -> Self {
        self.config.meter_falloff = falloff;
        self
    }

    /// Default: 0.1 s
    pub fn midi_meter_window(mut self, secs: f64) -> Self {
        self.config.midi_meter_window_secs = secs;
        self
    }

    /// Default: 8192
    pub fn max_block_size(mut self, frames: usize) -> Self {
        self.config.max_block_size = frames;
        self
    }

    /// Default: 64
    pub fn command_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.command_queue_capacity = capacity;
        self
    }

    pub fn port_templates(
        mut self,
        input: impl Into<String>,
        output: impl Into<String>,
        midi: impl Into<String>,
    ) -> Self {
        self.config.input_port_template = input.into();
        self.config.output_port_template = output.into();
        self.config.midi_port_template = midi.into();
        self
    }

    /// Validates the configuration and takes ownership of `driver`.
    pub fn build<D: AudioDriver>(self, driver: D) -> Result<HostClient<D>> {
        HostClient::new(driver, self.config)
    }
}
