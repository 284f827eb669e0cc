//! Frame encoding for the CFA-779 protocol.
//!
//! Logical frame (CRC coverage):
//! - CODE (1 byte): command code, sent as the SMBus command byte
//! - LENGTH (1 byte): payload length + 2, sent as the SMBus block count
//! - PAYLOAD (0-16 bytes): command-specific data
//! - CRC (2 bytes, little-endian): complemented CCITT over CODE, LENGTH
//!   and PAYLOAD
//!
//! Only PAYLOAD and CRC are physically transmitted as the block body.

use heapless::Vec;

use crate::crc::{crc16_update, CRC_SEED};
use crate::reply::MAX_REPLY_SIZE;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 16;

/// Size of the CRC trailer
pub const CRC_SIZE: usize = 2;

/// Maximum block body size (payload + CRC)
pub const MAX_BODY_SIZE: usize = MAX_PAYLOAD_SIZE + CRC_SIZE;

/// Errors that can occur while encoding frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Data does not fit in a single block
    PayloadTooLarge,
}

/// A command code with its payload, before framing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Command code
    pub code: u8,
    /// Payload data, never longer than [`MAX_PAYLOAD_SIZE`]
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Packet {
    /// Create a packet, clamping the payload to [`MAX_PAYLOAD_SIZE`]
    pub fn new(code: u8, payload: &[u8]) -> Self {
        let len = payload.len().min(MAX_PAYLOAD_SIZE);
        let mut vec = Vec::new();
        // Cannot fail: len is clamped to capacity
        let _ = vec.extend_from_slice(&payload[..len]);
        Self { code, payload: vec }
    }

    /// Create a packet with no payload
    pub fn empty(code: u8) -> Self {
        Self {
            code,
            payload: Vec::new(),
        }
    }

    /// Frame this packet for transmission
    pub fn to_block_frame(&self) -> BlockFrame {
        build_frame(self.code, &self.payload)
    }
}

/// What actually goes on the wire for one command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockFrame {
    /// Command code (SMBus command byte)
    pub code: u8,
    /// Block body: payload followed by the CRC trailer
    pub body: Vec<u8, MAX_BODY_SIZE>,
}

impl BlockFrame {
    /// Declared block length (payload length + 2)
    pub fn length(&self) -> u8 {
        self.body.len() as u8
    }

    /// Payload part of the body
    pub fn payload(&self) -> &[u8] {
        &self.body[..self.body.len() - CRC_SIZE]
    }

    /// CRC trailer value
    pub fn crc(&self) -> u16 {
        let n = self.body.len();
        u16::from_le_bytes([self.body[n - 2], self.body[n - 1]])
    }
}

/// Build the block frame for `code` and `payload`
///
/// Payloads longer than [`MAX_PAYLOAD_SIZE`] are clamped.
pub fn build_frame(code: u8, payload: &[u8]) -> BlockFrame {
    let payload = &payload[..payload.len().min(MAX_PAYLOAD_SIZE)];
    let length = (payload.len() + CRC_SIZE) as u8;

    let crc = !crc16_update(crc16_update(CRC_SEED, &[code, length]), payload);

    let mut body = Vec::new();
    // Cannot fail: payload is clamped so the body fits
    let _ = body.extend_from_slice(payload);
    let _ = body.extend_from_slice(&crc.to_le_bytes());

    BlockFrame { code, body }
}

/// Encode a reply block the way the panel does (for testing or simulation)
///
/// Produces `[echo][data...][crc_lo][crc_hi]` with the CRC computed over the
/// block count followed by everything except the trailer.
pub fn encode_reply(echo: u8, data: &[u8]) -> Result<Vec<u8, MAX_REPLY_SIZE>, FrameError> {
    let n = data.len() + 1 + CRC_SIZE;
    if n > MAX_REPLY_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }

    let mut reply = Vec::new();
    reply.push(echo).map_err(|_| FrameError::PayloadTooLarge)?;
    reply
        .extend_from_slice(data)
        .map_err(|_| FrameError::PayloadTooLarge)?;

    let crc = !crc16_update(crc16_update(CRC_SEED, &[n as u8]), &reply);
    reply
        .extend_from_slice(&crc.to_le_bytes())
        .map_err(|_| FrameError::PayloadTooLarge)?;

    Ok(reply)
}
