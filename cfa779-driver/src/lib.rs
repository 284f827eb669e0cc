//! Host-side driver for the CFA-779 LCD with keypad
//!
//! This crate contains the device logic on top of a
//! [`BlockTransport`](cfa779_hal::BlockTransport):
//!
//! - Command API with range checks and reply validation
//! - Shadow state of the last-commanded settings
//! - Keypad poller producing key events
//! - Control-panel attributes for operator access
//! - Driver configuration (serde-loadable)

#![no_std]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod attributes;
pub mod config;
pub mod device;
pub mod error;
pub mod poller;
pub mod state;

#[cfg(test)]
mod mock;

pub use attributes::{Attribute, ControlPanel};
pub use config::{DriverConfig, KeypadMode, ValidationPolicy};
pub use device::Cfa779;
pub use error::Error;
pub use poller::{ChannelSink, KeySink, KeypadPoller, PollerHandle, PollerState};
pub use state::DeviceState;
