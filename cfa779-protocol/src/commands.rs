//! Command codes and typed commands
//!
//! Every operation the panel understands maps to a fixed command code.
//! [`Command::to_packet`] performs the range checks and payload shaping,
//! so an out-of-range value never reaches the bus.

use crate::frame::Packet;
use crate::reply::MIN_REPLY_SIZE;

// Command codes
pub const CMD_IDENTIFY: u8 = 0;
pub const CMD_LINE1: u8 = 1;
pub const CMD_LINE2: u8 = 2;
pub const CMD_USER_CHAR: u8 = 3;
pub const CMD_CURSOR_POS: u8 = 4;
pub const CMD_CURSOR_STYLE: u8 = 5;
pub const CMD_CONTRAST: u8 = 6;
pub const CMD_BACKLIGHT: u8 = 7;
pub const CMD_VERSION: u8 = 8;
pub const CMD_KEYPAD: u8 = 9;

/// Display dimensions
pub const NUM_COLUMNS: usize = 16;
pub const NUM_ROWS: usize = 2;

/// Number of keypad keys
pub const NUM_KEYS: usize = 5;

/// Setting limits
pub const MAX_CONTRAST: u8 = 200;
pub const MAX_BACKLIGHT: u8 = 100;
pub const MAX_CURSOR_STYLE: u8 = 3;

/// Shadow value for settings not written since the session started
pub const UNSET: u8 = 255;

/// Total length of a keypad status reply (echo + 11 data bytes + CRC)
pub const KEYPAD_REPLY_LEN: usize = 14;

/// Number of values defining a user character (code + 8 bitmap rows)
pub const USER_CHAR_LEN: usize = 9;

/// Command validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Value outside the documented range
    OutOfRange,
    /// Raw command without a code byte
    Empty,
}

/// Display line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    One,
    Two,
}

impl Line {
    /// Command code that writes this line
    pub fn code(self) -> u8 {
        match self {
            Line::One => CMD_LINE1,
            Line::Two => CMD_LINE2,
        }
    }
}

/// Commands the host can send to the panel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Presence probe / reset
    Identify,
    /// Replace a full line of text (padded or truncated to 16 columns)
    Text { line: Line, text: &'a [u8] },
    /// Define a user character: code followed by 8 bitmap rows
    UserCharacter { code: u8, bitmap: [u8; 8] },
    /// Move the cursor
    CursorPosition { col: u8, row: u8 },
    /// Cursor style (0-3)
    CursorStyle(u8),
    /// Contrast (0-200)
    Contrast(u8),
    /// Backlight (0-100)
    Backlight(u8),
    /// Hardware/firmware version query
    Version,
    /// Keypad status query
    KeypadStatus,
    /// Arbitrary code and payload, no range checks
    Raw { code: u8, payload: &'a [u8] },
}

impl<'a> Command<'a> {
    /// Parse raw operator input where the first byte is the command code
    pub fn raw(input: &'a [u8]) -> Result<Self, CommandError> {
        match input.split_first() {
            Some((&code, payload)) => Ok(Command::Raw { code, payload }),
            None => Err(CommandError::Empty),
        }
    }

    /// Command code on the wire
    pub fn code(&self) -> u8 {
        match self {
            Command::Identify => CMD_IDENTIFY,
            Command::Text { line, .. } => line.code(),
            Command::UserCharacter { .. } => CMD_USER_CHAR,
            Command::CursorPosition { .. } => CMD_CURSOR_POS,
            Command::CursorStyle(_) => CMD_CURSOR_STYLE,
            Command::Contrast(_) => CMD_CONTRAST,
            Command::Backlight(_) => CMD_BACKLIGHT,
            Command::Version => CMD_VERSION,
            Command::KeypadStatus => CMD_KEYPAD,
            Command::Raw { code, .. } => *code,
        }
    }

    /// Whether the reply must always be read back and validated
    ///
    /// Setters only read a reply when strict validation is enabled.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Command::Identify | Command::Version | Command::KeypadStatus | Command::Raw { .. }
        )
    }

    /// Number of data bytes a reply should carry, if fixed
    pub fn expected_reply_len(&self) -> Option<usize> {
        match self {
            Command::KeypadStatus => Some(KEYPAD_REPLY_LEN - MIN_REPLY_SIZE),
            Command::Version | Command::Raw { .. } => None,
            _ => Some(0),
        }
    }

    /// Check ranges and build the packet for this command
    pub fn to_packet(&self) -> Result<Packet, CommandError> {
        match self {
            Command::Identify | Command::Version | Command::KeypadStatus => {
                Ok(Packet::empty(self.code()))
            }
            Command::Text { line, text } => {
                let mut columns = [b' '; NUM_COLUMNS];
                let len = text.len().min(NUM_COLUMNS);
                columns[..len].copy_from_slice(&text[..len]);
                Ok(Packet::new(line.code(), &columns))
            }
            Command::UserCharacter { code, bitmap } => {
                let mut payload = [0u8; USER_CHAR_LEN];
                payload[0] = *code;
                payload[1..].copy_from_slice(bitmap);
                Ok(Packet::new(CMD_USER_CHAR, &payload))
            }
            Command::CursorPosition { col, row } => {
                if *col as usize > NUM_COLUMNS || *row as usize >= NUM_ROWS {
                    return Err(CommandError::OutOfRange);
                }
                Ok(Packet::new(CMD_CURSOR_POS, &[*col, *row]))
            }
            Command::CursorStyle(style) => Self::bounded(CMD_CURSOR_STYLE, *style, MAX_CURSOR_STYLE),
            Command::Contrast(value) => Self::bounded(CMD_CONTRAST, *value, MAX_CONTRAST),
            Command::Backlight(value) => Self::bounded(CMD_BACKLIGHT, *value, MAX_BACKLIGHT),
            Command::Raw { code, payload } => Ok(Packet::new(*code, payload)),
        }
    }

    fn bounded(code: u8, value: u8, max: u8) -> Result<Packet, CommandError> {
        if value > max {
            return Err(CommandError::OutOfRange);
        }
        Ok(Packet::new(code, &[value]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_space_padded() {
        let packet = Command::Text {
            line: Line::One,
            text: b"hi",
        }
        .to_packet()
        .unwrap();

        assert_eq!(packet.code, CMD_LINE1);
        assert_eq!(packet.payload.len(), 16);
        assert_eq!(&packet.payload[..2], b"hi");
        assert!(packet.payload[2..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_text_is_truncated() {
        let packet = Command::Text {
            line: Line::Two,
            text: b"0123456789ABCDEFXYZ",
        }
        .to_packet()
        .unwrap();

        assert_eq!(packet.code, CMD_LINE2);
        assert_eq!(&packet.payload[..], b"0123456789ABCDEF");
    }

    #[test]
    fn test_range_limits() {
        assert!(Command::Contrast(200).to_packet().is_ok());
        assert_eq!(Command::Contrast(201).to_packet(), Err(CommandError::OutOfRange));
        assert!(Command::Backlight(100).to_packet().is_ok());
        assert_eq!(Command::Backlight(101).to_packet(), Err(CommandError::OutOfRange));
        assert!(Command::CursorStyle(3).to_packet().is_ok());
        assert_eq!(Command::CursorStyle(4).to_packet(), Err(CommandError::OutOfRange));
    }

    #[test]
    fn test_cursor_position_limits() {
        let ok = Command::CursorPosition { col: 16, row: 1 }.to_packet().unwrap();
        assert_eq!(ok.code, CMD_CURSOR_POS);
        assert_eq!(&ok.payload[..], &[16, 1]);

        assert_eq!(
            Command::CursorPosition { col: 17, row: 0 }.to_packet(),
            Err(CommandError::OutOfRange)
        );
        assert_eq!(
            Command::CursorPosition { col: 0, row: 2 }.to_packet(),
            Err(CommandError::OutOfRange)
        );
    }

    #[test]
    fn test_user_character_layout() {
        let packet = Command::UserCharacter {
            code: 2,
            bitmap: [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F, 0x00],
        }
        .to_packet()
        .unwrap();

        assert_eq!(packet.code, CMD_USER_CHAR);
        assert_eq!(packet.payload.len(), USER_CHAR_LEN);
        assert_eq!(packet.payload[0], 2);
        assert_eq!(packet.payload[1], 0x1F);
    }

    #[test]
    fn test_raw_command() {
        let cmd = Command::raw(&[0x08, 1, 2]).unwrap();
        assert_eq!(cmd.code(), 0x08);
        assert!(cmd.is_query());
        assert_eq!(&cmd.to_packet().unwrap().payload[..], &[1, 2]);

        assert_eq!(Command::raw(&[]), Err(CommandError::Empty));
    }

    #[test]
    fn test_expected_reply_len() {
        assert_eq!(Command::KeypadStatus.expected_reply_len(), Some(11));
        assert_eq!(Command::Identify.expected_reply_len(), Some(0));
        assert_eq!(Command::Version.expected_reply_len(), None);
        assert!(!Command::Contrast(10).is_query());
    }
}
