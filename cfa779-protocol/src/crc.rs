//! CRC-16/CCITT as used by the CFA-779
//!
//! The panel runs the reflected CCITT polynomial (x^16 + x^12 + x^5 + 1,
//! LSB first) from a seed of `0xFFFF` and complements the result before
//! appending it to a frame. This is the CRC-16/X-25 parameter set.

/// Initial CRC register value
pub const CRC_SEED: u16 = 0xFFFF;

/// CCITT polynomial in reflected (LSB-first) form
const POLY_REFLECTED: u16 = 0x8408;

/// Feed `data` into a running CCITT CRC
///
/// Returns the raw register, not complemented. Chain calls to cover
/// non-contiguous data, then complement once at the end.
pub fn crc16_update(mut crc: u16, data: &[u8]) -> u16 {
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Complemented CRC-16/CCITT of `data`, seeded with `0xFFFF`
pub fn crc16(data: &[u8]) -> u16 {
    !crc16_update(CRC_SEED, data)
}
