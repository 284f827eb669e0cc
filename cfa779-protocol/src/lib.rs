//! CFA-779 Communication Protocol
//!
//! This crate defines the SMBus-based protocol between the host and the
//! CFA-779 character LCD (16x2 text, 5-key keypad). Every command is a
//! small frame protected by a CRC-16 trailer and every reply echoes the
//! command code that produced it.
//!
//! # Protocol Overview
//!
//! The logical frame used for CRC coverage:
//! ```text
//! ┌──────┬────────┬─────────────┬────────┬────────┐
//! │ CODE │ LENGTH │ PAYLOAD     │ CRC_LO │ CRC_HI │
//! │ 1B   │ 1B     │ 0–16B       │ 1B     │ 1B     │
//! └──────┴────────┴─────────────┴────────┴────────┘
//! ```
//!
//! CODE travels as the SMBus command byte and LENGTH as the block count,
//! so only PAYLOAD and the CRC bytes form the block body on the wire.
//!
//! Replies come back as a block `[ECHO][DATA...][CRC_LO][CRC_HI]`, where
//! ECHO is the command code with bit `0x40` used as a status flag.

#![no_std]
#![deny(unsafe_code)]

pub mod commands;
pub mod crc;
pub mod events;
pub mod frame;
pub mod keypad;
pub mod reply;

pub use commands::{Command, CommandError, Line};
pub use crc::crc16;
pub use events::{Key, KeyEvent};
pub use frame::{build_frame, encode_reply, BlockFrame, FrameError, Packet, MAX_PAYLOAD_SIZE};
pub use keypad::KeypadStatus;
pub use reply::{validate, Reply, ReplyError, MAX_REPLY_SIZE};
