//! Real-time kernel for hosting one processing module on an audio driver.
//!
//! # Primary API
//!
//! - [`ProcessingHost`] / [`HostHandle`]: audio-thread orchestration and its control-plane half
//! - [`ProcessingModule`] / [`ModuleIo`]: what a hosted module implements and sees
//! - [`EventSplitter`]: sample-accurate MIDI dispatch inside a block
//! - [`LevelMeter`], [`MidiActivityMeter`], [`MeteringHandle`]: signal telemetry
//! - [`ParameterBridge`] / [`ParameterHandle`]: lock-free parameter hand-off
//! - [`AudioDriver`] / [`OfflineDriver`]: setup-time driver contract
//! - [`BlockBuffers`]: host-owned channel storage
//!
//! # Feature-gated APIs
//!
//! - `"cpal"`: [`CpalOutput`] runs a host on the default output device
//!
//! # Example
//!
//! ```ignore
//! use modhost_core::{BlockBuffers, HostConfig, ProcessingHost};
//!
//! let (mut host, handle) = ProcessingHost::new(my_module, &HostConfig::default())?;
//! host.init(48_000.0)?;
//!
//! let mut buffers = BlockBuffers::for_host(&host);
//! buffers.run(&mut host, 256, None)?;
//! println!("out 0: {}", handle.metering().output_level(0));
//! ```

pub mod buffers;
pub mod config;
pub mod driver;
pub mod error;
pub mod host;
pub mod metering;
pub mod module;
pub mod parameter;
pub mod splitter;

pub(crate) mod lockfree;

#[cfg(feature = "cpal")]
pub mod output;

pub use buffers::BlockBuffers;
pub use config::{HostConfig, DEFAULT_MAX_BLOCK_SIZE, DEFAULT_METER_FALLOFF};
pub use driver::{AudioDriver, OfflineDriver, PortId, PortKind, PortRecord};
pub use error::{Error, Result};
pub use host::{AudioBlock, ConfigureReply, HostHandle, ProcessingHost, MAX_OUTPUTS};
pub use lockfree::{AtomicFlag, AtomicFloat};
pub use metering::{LevelMeter, MeterTaps, MeteringHandle, MidiActivityMeter, METER_FLOOR};
pub use module::{dispatch_midi, ConfigureSink, ModuleIo, ProcessingModule};
pub use parameter::{ParameterBridge, ParameterHandle, ParameterInfo, ParameterRange, ParameterScale};
pub use splitter::{EventSplitter, SplitHandler};

#[cfg(feature = "cpal")]
pub use output::{CpalOutput, LiveMidiSender, DEFAULT_LIVE_MIDI_CAPACITY};

pub use modhost_midi::{MidiBuffer, MidiMessage, RawMidiEvent};
