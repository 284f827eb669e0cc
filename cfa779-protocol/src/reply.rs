//! Reply validation
//!
//! A reply block is `[echo][data...][crc_lo][crc_hi]`. The panel computes
//! the CRC over the block count followed by every byte before the trailer,
//! so a reply of `n` bytes is checked against `[n] ++ raw[..n - 2]`.
//!
//! CRC and minimum-length failures are hard errors. A wrong echo code or an
//! unexpected length is only recorded on the [`Reply`]; the caller decides
//! whether that is fatal (see [`Reply::ensure_strict`]).

use crate::crc::{crc16_update, CRC_SEED};
use crate::frame::CRC_SIZE;

/// Largest reply the panel can produce (one SMBus block)
pub const MAX_REPLY_SIZE: usize = 32;

/// Smallest reply that can hold an echo byte and a CRC
pub const MIN_REPLY_SIZE: usize = 1 + CRC_SIZE;

/// Status bit the panel may set in the echoed code
pub const STATUS_FLAG: u8 = 0x40;

/// Mask applied to the echo before comparing with the request code
const ECHO_MASK: u8 = !STATUS_FLAG;

/// Reply validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// Reply absent or too short to hold a frame
    NoReply { len: usize },
    /// CRC trailer does not match the reply contents
    Checksum { expected: u16, received: u16 },
    /// Echoed code differs from the request (strict mode only)
    CodeMismatch { expected: u8, received: u8 },
    /// Reply length differs from the expected length (strict mode only)
    LengthMismatch { expected: usize, actual: usize },
    /// Device reported more bytes than a block can hold
    Truncated { len: usize },
}

impl core::fmt::Display for ReplyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReplyError::NoReply { len } => write!(f, "no reply (length {})", len),
            ReplyError::Checksum { expected, received } => write!(
                f,
                "invalid CRC (expected {:#06X}, received {:#06X})",
                expected, received
            ),
            ReplyError::CodeMismatch { expected, received } => write!(
                f,
                "cmd {:#04X} failed with code {:#04X}",
                expected, received
            ),
            ReplyError::LengthMismatch { expected, actual } => write!(
                f,
                "invalid packet length: {}, expected: {}",
                actual, expected
            ),
            ReplyError::Truncated { len } => write!(f, "reply of {} bytes exceeds a block", len),
        }
    }
}

/// A reply that passed the CRC check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reply<'a> {
    raw: &'a [u8],
    code: u8,
    expected_len: Option<usize>,
}

impl<'a> Reply<'a> {
    /// Command code this reply answers
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Total reply length including echo and CRC
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Always false: a validated reply holds at least the echo and CRC
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Full reply block as received
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Reply without the CRC trailer; byte 0 is the echoed code
    pub fn payload(&self) -> &'a [u8] {
        &self.raw[..self.raw.len() - CRC_SIZE]
    }

    /// Data between the echoed code and the CRC trailer
    pub fn data(&self) -> &'a [u8] {
        &self.raw[1..self.raw.len() - CRC_SIZE]
    }

    /// Echoed command byte, status flag included
    pub fn echo(&self) -> u8 {
        self.raw[0]
    }

    /// Whether the panel set the status flag in the echo
    pub fn status_flag(&self) -> bool {
        self.raw[0] & STATUS_FLAG != 0
    }

    /// The raw echo byte when it does not match the request code
    pub fn code_mismatch(&self) -> Option<u8> {
        (self.raw[0] & ECHO_MASK != self.code).then_some(self.raw[0])
    }

    /// `(expected, actual)` total lengths when they differ
    pub fn length_mismatch(&self) -> Option<(usize, usize)> {
        self.expected_len
            .map(|len| len + MIN_REPLY_SIZE)
            .filter(|&expected| expected != self.raw.len())
            .map(|expected| (expected, self.raw.len()))
    }

    /// Promote echo and length diagnostics to errors
    pub fn ensure_strict(self) -> Result<Self, ReplyError> {
        if let Some(received) = self.code_mismatch() {
            return Err(ReplyError::CodeMismatch {
                expected: self.code,
                received,
            });
        }
        if let Some((expected, actual)) = self.length_mismatch() {
            return Err(ReplyError::LengthMismatch { expected, actual });
        }
        Ok(self)
    }
}

/// Validate a raw reply block for command `code`
///
/// `expected_len` is the number of data bytes the command should return
/// (excluding echo and CRC), or `None` to accept any length.
pub fn validate(code: u8, expected_len: Option<usize>, raw: &[u8]) -> Result<Reply<'_>, ReplyError> {
    let n = raw.len();
    if n < MIN_REPLY_SIZE {
        return Err(ReplyError::NoReply { len: n });
    }
    if n > MAX_REPLY_SIZE {
        return Err(ReplyError::Truncated { len: n });
    }

    let expected = !crc16_update(crc16_update(CRC_SEED, &[n as u8]), &raw[..n - CRC_SIZE]);
    let received = u16::from_le_bytes([raw[n - 2], raw[n - 1]]);
    if expected != received {
        return Err(ReplyError::Checksum { expected, received });
    }

    Ok(Reply {
        raw,
        code,
        expected_len,
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::frame::encode_reply;
    use proptest::prelude::*;

    #[test]
    fn test_short_reply() {
        assert_eq!(validate(0x08, None, &[]), Err(ReplyError::NoReply { len: 0 }));
        assert_eq!(
            validate(0x08, None, &[0x08, 0x00]),
            Err(ReplyError::NoReply { len: 2 })
        );
    }

    #[test]
    fn test_minimal_reply() {
        let raw = encode_reply(0x00, &[]).unwrap();
        let reply = validate(0x00, Some(0), &raw).unwrap();

        assert_eq!(reply.len(), 3);
        assert_eq!(reply.payload(), &[0x00]);
        assert!(reply.data().is_empty());
        assert_eq!(reply.code_mismatch(), None);
        assert_eq!(reply.length_mismatch(), None);
    }

    #[test]
    fn test_corrupted_crc() {
        let mut raw = encode_reply(0x08, b"HW1").unwrap();
        raw[4] ^= 0x01;
        assert!(matches!(
            validate(0x08, None, &raw),
            Err(ReplyError::Checksum { .. })
        ));
    }

    #[test]
    fn test_status_flag_is_not_a_mismatch() {
        let raw = encode_reply(0x48, b"x").unwrap();
        let reply = validate(0x08, None, &raw).unwrap();

        assert!(reply.status_flag());
        assert_eq!(reply.echo(), 0x48);
        assert_eq!(reply.code_mismatch(), None);
    }

    #[test]
    fn test_code_mismatch_is_diagnostic() {
        let raw = encode_reply(0x07, &[1, 2]).unwrap();
        let reply = validate(0x09, None, &raw).unwrap();

        // Payload is still delivered
        assert_eq!(reply.data(), &[1, 2]);
        assert_eq!(reply.code_mismatch(), Some(0x07));
        assert_eq!(
            reply.ensure_strict(),
            Err(ReplyError::CodeMismatch {
                expected: 0x09,
                received: 0x07
            })
        );
    }

    #[test]
    fn test_length_mismatch_is_diagnostic() {
        let raw = encode_reply(0x09, &[0; 5]).unwrap();
        let reply = validate(0x09, Some(11), &raw).unwrap();

        assert_eq!(reply.length_mismatch(), Some((14, 8)));
        assert_eq!(reply.data().len(), 5);
        assert_eq!(
            reply.ensure_strict(),
            Err(ReplyError::LengthMismatch {
                expected: 14,
                actual: 8
            })
        );
    }

    #[test]
    fn test_oversized_reply() {
        let raw = [0u8; MAX_REPLY_SIZE + 1];
        assert_eq!(
            validate(0x08, None, &raw),
            Err(ReplyError::Truncated {
                len: MAX_REPLY_SIZE + 1
            })
        );
    }

    proptest! {
        #[test]
        fn prop_reply_roundtrip(code in 0u8..0x40, data in proptest::collection::vec(any::<u8>(), 0..=16)) {
            let raw = encode_reply(code, &data).unwrap();
            let reply = validate(code, Some(data.len()), &raw).unwrap();
            prop_assert_eq!(reply.data(), &data[..]);
            prop_assert_eq!(reply.payload()[0], code);
            prop_assert!(reply.ensure_strict().is_ok());
        }

        #[test]
        fn prop_single_bit_flip_fails_crc(
            code in 0u8..0x40,
            data in proptest::collection::vec(any::<u8>(), 0..=16),
            bit in any::<prop::sample::Index>(),
        ) {
            let mut raw = encode_reply(code, &data).unwrap();
            let bit = bit.index(raw.len() * 8);
            raw[bit / 8] ^= 1 << (bit % 8);
            let is_checksum_error = matches!(validate(code, None, &raw), Err(ReplyError::Checksum { .. }));
            prop_assert!(is_checksum_error);
        }
    }
}
