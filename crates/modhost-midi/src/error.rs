//! Error types for modhost-midi.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("MIDI buffer full ({capacity} events)")]
    BufferFull { capacity: usize },

    #[error("MIDI event at {time} precedes previous event at {last}")]
    OutOfOrder { time: u32, last: u32 },

    #[error("MIDI event has no bytes")]
    EmptyEvent,
}

pub type Result<T> = std::result::Result<T, Error>;
