//! Key events from the CFA-779 keypad

use crate::commands::NUM_KEYS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keypad keys, in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
}

// Linux input keycodes
const KEY_ENTER: u16 = 28;
const KEY_UP: u16 = 103;
const KEY_LEFT: u16 = 105;
const KEY_RIGHT: u16 = 106;
const KEY_DOWN: u16 = 108;

impl Key {
    /// All keys, indexed by slot
    pub const ALL: [Key; NUM_KEYS] = [Key::Up, Key::Down, Key::Left, Key::Right, Key::Enter];

    /// Key at a keypad slot
    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    /// Keypad slot of this key
    pub fn slot(self) -> usize {
        match self {
            Key::Up => 0,
            Key::Down => 1,
            Key::Left => 2,
            Key::Right => 3,
            Key::Enter => 4,
        }
    }

    /// Linux input subsystem keycode
    pub fn keycode(self) -> u16 {
        match self {
            Key::Up => KEY_UP,
            Key::Down => KEY_DOWN,
            Key::Left => KEY_LEFT,
            Key::Right => KEY_RIGHT,
            Key::Enter => KEY_ENTER,
        }
    }
}

/// A single press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self { key, pressed: true }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            pressed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_roundtrip() {
        for (slot, key) in Key::ALL.iter().enumerate() {
            assert_eq!(key.slot(), slot);
            assert_eq!(Key::from_slot(slot), Some(*key));
        }
        assert_eq!(Key::from_slot(NUM_KEYS), None);
    }

    #[test]
    fn test_keycodes() {
        assert_eq!(Key::Up.keycode(), 103);
        assert_eq!(Key::Enter.keycode(), 28);
    }
}
