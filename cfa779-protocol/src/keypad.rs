//! Keypad status decoding
//!
//! The keypad status reply is exactly 14 bytes. Each of the five keys owns
//! one "pressed" byte and one "released" byte; a non-zero value means the
//! transition was observed since the previous query.

use crate::commands::{KEYPAD_REPLY_LEN, NUM_KEYS};
use crate::events::{Key, KeyEvent};
use crate::frame::CRC_SIZE;

/// Reply offsets of the "pressed" byte per slot
const PRESS_OFFSETS: [usize; NUM_KEYS] = [4, 5, 2, 3, 6];

/// Reply offsets of the "released" byte per slot
const RELEASE_OFFSETS: [usize; NUM_KEYS] = [9, 10, 7, 8, 11];

/// One decoded keypad status reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeypadStatus {
    raw: [u8; KEYPAD_REPLY_LEN],
}

impl KeypadStatus {
    /// Decode a validated reply block
    ///
    /// Returns `None` unless the reply is exactly 14 bytes long.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let raw: [u8; KEYPAD_REPLY_LEN] = raw.try_into().ok()?;
        Some(Self { raw })
    }

    /// Whether a press was observed on `slot`
    pub fn pressed(&self, slot: usize) -> bool {
        PRESS_OFFSETS
            .get(slot)
            .is_some_and(|&offset| self.raw[offset] != 0)
    }

    /// Whether a release was observed on `slot`
    pub fn released(&self, slot: usize) -> bool {
        RELEASE_OFFSETS
            .get(slot)
            .is_some_and(|&offset| self.raw[offset] != 0)
    }

    /// Events for this reply, in slot order, press before release
    pub fn events(&self) -> impl Iterator<Item = KeyEvent> + '_ {
        Key::ALL.into_iter().flat_map(move |key| {
            let slot = key.slot();
            let press = self.pressed(slot).then(|| KeyEvent::press(key));
            let release = self.released(slot).then(|| KeyEvent::release(key));
            press.into_iter().chain(release)
        })
    }

    /// Status bytes between the echo and the CRC trailer
    pub fn data(&self) -> &[u8] {
        &self.raw[1..KEYPAD_REPLY_LEN - CRC_SIZE]
    }

    /// Full reply block
    pub fn raw(&self) -> &[u8; KEYPAD_REPLY_LEN] {
        &self.raw
    }
}
