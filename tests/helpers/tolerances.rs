//! Tolerance constants for host tests.

/// Floating point rounding errors (passthrough, exact gain).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Meter envelopes are computed in f64 and stored as f32.
pub const METER_EPSILON: f32 = 1e-5;

/// Silence threshold (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;
