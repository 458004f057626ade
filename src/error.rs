//! Centralized error type for the modhost umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] modhost_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] modhost_midi::Error),

    #[error("No host at index {index} ({len} open)")]
    HostIndex { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
