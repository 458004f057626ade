//! Error types for modhost-core.
//!
//! Only setup-time and control-plane operations return errors. The
//! per-callback processing path has no failure mode.

use thiserror::Error;

/// Error type for modhost-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Could not register {kind} port '{name}'")]
    PortRegistration { name: String, kind: crate::PortKind },

    #[error("Could not connect ports '{from}' and '{to}'")]
    Connection { from: String, to: String },

    #[error("Driver client is closed")]
    DriverClosed,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Module declares {count} output channels, at most {max} are supported")]
    TooManyOutputs { count: usize, max: usize },

    #[error("Parameter index {index} out of range ({count} parameters)")]
    ParameterIndex { index: usize, count: usize },

    #[error("Expected {expected} parameter values, got {got}")]
    ParameterCount { expected: usize, got: usize },

    #[error("Block of {frames} frames exceeds maximum of {max}")]
    BlockTooLarge { frames: usize, max: usize },

    #[error("Module command queue is full")]
    CommandQueueFull,

    #[error("Module rejected setting '{key}': {message}")]
    Configure { key: String, message: String },

    #[error("Audio host is gone")]
    HostDisconnected,

    #[error(transparent)]
    Midi(#[from] modhost_midi::Error),

    #[cfg(feature = "cpal")]
    #[error("No audio output device")]
    NoOutputDevice,

    #[cfg(feature = "cpal")]
    #[error("Audio device not available")]
    DeviceNotAvailable(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "cpal")]
    #[error("Failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "cpal")]
    #[error("Failed to play audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
