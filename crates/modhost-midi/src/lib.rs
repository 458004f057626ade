//! MIDI types for the modhost real-time core.
//!
//! - [`RawMidiEvent`]: a timestamped raw MIDI message borrowed for one callback
//! - [`MidiBuffer`]: pre-allocated, time-ordered event list for one block
//! - [`MidiMessage`]: channel-voice decoding used to dispatch events to a module

pub mod buffer;
pub mod error;
pub mod event;
pub mod message;

pub use buffer::MidiBuffer;
pub use error::{Error, Result};
pub use event::RawMidiEvent;
pub use message::MidiMessage;
