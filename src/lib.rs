//! # modhost - Real-time Module Host
//!
//! Runs processing modules inside an audio driver's callback with
//! sample-accurate MIDI, per-channel level metering and lock-free
//! parameter updates.
//!
//! ## Architecture
//!
//! modhost is an umbrella crate that coordinates:
//! - **modhost-core** - Real-time kernel (host, event splitter, meters, parameter bridge, driver contract)
//! - **modhost-midi** - MIDI types (raw events, per-block buffers, channel-voice decoding)
//!
//! On top of these it adds [`HostClient`], which owns a driver client and
//! registers ports for every host opened on it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use modhost::prelude::*;
//!
//! let client = HostClient::builder().build(OfflineDriver::new("calf", 48_000.0))?;
//! let (mut host, handle) = client.open_host(my_module)?;
//!
//! let mut buffers = BlockBuffers::for_host(&host);
//! buffers.run(&mut host, 512, None)?;
//!
//! handle.set_param(0, 0.7)?;
//! println!("output 0: {}", handle.metering().output_level(0));
//! ```
//!
//! ## Feature Flags
//!
//! - `cpal` - Run a host on the default output device

/// Re-export of modhost-core for direct access
pub use modhost_core as core;

/// Re-export of modhost-midi for direct access
pub use modhost_midi as midi;

pub use modhost_core::{
    // Buffers and drivers
    AudioBlock,
    AudioDriver,
    BlockBuffers,
    // Host
    ConfigureReply,
    ConfigureSink,
    HostConfig,
    HostHandle,
    // Metering
    LevelMeter,
    MeteringHandle,
    MidiActivityMeter,
    ModuleIo,
    OfflineDriver,
    // Parameters
    ParameterHandle,
    ParameterInfo,
    ParameterRange,
    ParameterScale,
    PortId,
    PortKind,
    ProcessingHost,
    ProcessingModule,
    MAX_OUTPUTS,
};

#[cfg(feature = "cpal")]
pub use modhost_core::{CpalOutput, LiveMidiSender};

pub use modhost_midi::{MidiBuffer, MidiMessage, RawMidiEvent};

mod builder;
mod client;
mod error;

pub use builder::HostClientBuilder;
pub use client::{port_name, HostClient, HostEntry, HostPort};
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{HostClient, HostClientBuilder, HostEntry};

    pub use crate::core::{
        AudioBlock, AudioDriver, BlockBuffers, ConfigureSink, HostConfig, HostHandle, ModuleIo,
        OfflineDriver, ParameterInfo, ParameterRange, ProcessingHost, ProcessingModule,
    };

    pub use crate::midi::{MidiBuffer, MidiMessage};

    #[cfg(feature = "cpal")]
    pub use crate::core::CpalOutput;
}
