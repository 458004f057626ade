//! Signal-level telemetry.
//!
//! - Audio thread: [`LevelMeter`] per channel, [`MidiActivityMeter`] per host
//! - Observers: [`MeteringHandle`] polls the values the host publishes to [`MeterTaps`]

mod handle;
mod level;
mod midi_activity;
mod taps;

pub use handle::MeteringHandle;
pub use level::{LevelMeter, METER_FLOOR};
pub use midi_activity::MidiActivityMeter;
pub use taps::MeterTaps;
