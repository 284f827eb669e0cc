//! CFA-779 Hardware Abstraction Layer
//!
//! The panel is reached through two SMBus primitives only: "write a block
//! tagged with a command code" and "read a block tagged with a command
//! code". This crate defines that contract as a trait so the protocol and
//! driver crates never touch a concrete bus.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  cfa779-driver (commands, keypad poll)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cfa779-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  SmbusI2c on  │       │ host-specific │
//! │ embedded-hal  │       │  SMBus impls  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`smbus::BlockTransport`] - SMBus block write / block read

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod smbus;

// Re-export key types at crate root for convenience
pub use i2c::{SmbusError, SmbusI2c};
pub use smbus::{BlockTransport, SmbusConfig, DEFAULT_ADDRESS, MAX_BLOCK_LEN};
