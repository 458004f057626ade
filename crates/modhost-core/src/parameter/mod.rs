//! Module parameters: declared ranges and the control-to-audio bridge.

mod bridge;
mod range;

pub use bridge::{ParameterBridge, ParameterHandle};
pub use range::{ParameterInfo, ParameterRange, ParameterScale};
