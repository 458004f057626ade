//! Integration test modules for modhost

pub mod metering;
pub mod parameters;
