//! Host configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default per-sample meter falloff (about one second of decay at common rates).
pub const DEFAULT_METER_FALLOFF: f32 = 0.999;

/// Largest block a host pre-allocates scratch storage for.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 8192;

/// Configuration shared by a client and every host it opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Per-sample multiplier of the level meters' peak envelope, in (0, 1).
    pub meter_falloff: f32,
    /// Time for the MIDI activity meter to fall from 1.0 to 0.0.
    pub midi_meter_window_secs: f64,
    pub max_block_size: usize,
    pub command_queue_capacity: usize,
    /// Port name templates; `%d` is replaced with a per-client running number.
    pub input_port_template: String,
    pub output_port_template: String,
    pub midi_port_template: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            meter_falloff: DEFAULT_METER_FALLOFF,
            midi_meter_window_secs: 0.1,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            command_queue_capacity: 64,
            input_port_template: "input_%d".to_string(),
            output_port_template: "output_%d".to_string(),
            midi_port_template: "midi_%d".to_string(),
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.meter_falloff > 0.0 && self.meter_falloff < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "meter_falloff {} must be in (0, 1)",
                self.meter_falloff
            )));
        }
        if !(self.midi_meter_window_secs > 0.0 && self.midi_meter_window_secs.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "midi_meter_window_secs {} must be positive",
                self.midi_meter_window_secs
            )));
        }
        if self.max_block_size == 0 {
            return Err(Error::InvalidConfig(
                "max_block_size must be non-zero".to_string(),
            ));
        }
        if self.command_queue_capacity == 0 {
            return Err(Error::InvalidConfig(
                "command_queue_capacity must be non-zero".to_string(),
            ));
        }
        for template in [
            &self.input_port_template,
            &self.output_port_template,
            &self.midi_port_template,
        ] {
            if !template.contains("%d") {
                return Err(Error::InvalidConfig(format!(
                    "port template '{}' has no %d placeholder",
                    template
                )));
            }
        }
        Ok(())
    }
}
