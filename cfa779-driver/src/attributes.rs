//! Control-panel attributes
//!
//! Named text attributes an operator reads and writes, each a thin adapter
//! over the command API. Reads render decimal text; writes take decimal
//! fields separated by whitespace, with trailing junk after the digits of a
//! field ignored.
//!
//! A [`ControlPanel`] borrows the device for the duration of one access, so
//! the same session can sit behind a mutex shared with the keypad poller.
//!
//! Exchange failures never surface here: a failed read renders an empty
//! value and a failed write is still acknowledged. Only malformed or
//! out-of-range input is reported as [`Error::InvalidArgument`].

use core::fmt::Write;

use heapless::String;

use cfa779_hal::BlockTransport;
use cfa779_protocol::commands::USER_CHAR_LEN;
use cfa779_protocol::Line;

use crate::device::Cfa779;
use crate::error::Error;

/// Capacity of a rendered attribute value
pub const SHOW_CAPACITY: usize = 128;

/// Driver version reported by the `version` attribute
const DRIVER_VERSION: &str = "1.1";

/// Control-panel attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Attribute {
    Version,
    Contrast,
    Backlight,
    CursorStyle,
    CursorPosition,
    Line1,
    Line2,
    UserCharacter,
    Keypad,
    RawCmd,
}

impl Attribute {
    pub const ALL: [Attribute; 10] = [
        Attribute::Version,
        Attribute::Contrast,
        Attribute::Backlight,
        Attribute::CursorStyle,
        Attribute::CursorPosition,
        Attribute::Line1,
        Attribute::Line2,
        Attribute::UserCharacter,
        Attribute::Keypad,
        Attribute::RawCmd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Version => "version",
            Attribute::Contrast => "contrast",
            Attribute::Backlight => "backlight",
            Attribute::CursorStyle => "cursor_style",
            Attribute::CursorPosition => "cursor_position",
            Attribute::Line1 => "line1",
            Attribute::Line2 => "line2",
            Attribute::UserCharacter => "user_character",
            Attribute::Keypad => "keypad",
            Attribute::RawCmd => "rawcmd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    pub fn is_readable(self) -> bool {
        matches!(
            self,
            Attribute::Version
                | Attribute::Contrast
                | Attribute::Backlight
                | Attribute::CursorStyle
                | Attribute::Keypad
        )
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, Attribute::Version | Attribute::Keypad)
    }
}

/// Attribute surface over a borrowed device session
pub struct ControlPanel<'a, T> {
    device: &'a mut Cfa779<T>,
}

impl<'a, T: BlockTransport> ControlPanel<'a, T> {
    pub fn new(device: &'a mut Cfa779<T>) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Cfa779<T> {
        self.device
    }

    pub fn device_mut(&mut self) -> &mut Cfa779<T> {
        self.device
    }

    /// Attributes exposed by this session
    ///
    /// `rawcmd` is listed only when enabled in the configuration.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> {
        let rawcmd = self.device.config().rawcmd;
        Attribute::ALL
            .into_iter()
            .filter(move |attr| *attr != Attribute::RawCmd || rawcmd)
    }

    /// Render an attribute value
    pub fn show(&mut self, attr: Attribute) -> Result<String<SHOW_CAPACITY>, Error<T::Error>> {
        if !attr.is_readable() {
            return Err(Error::NotSupported);
        }

        let mut out = String::new();
        match attr {
            Attribute::Version => {
                let hardware: String<32> = self.device.version().unwrap_or_default();
                writeln!(
                    out,
                    "cfa779 LCD Driver Version {} (Hardware {})",
                    DRIVER_VERSION, hardware
                )?;
            }
            Attribute::Contrast => writeln!(out, "{}", self.device.state().contrast())?,
            Attribute::Backlight => writeln!(out, "{}", self.device.state().backlight())?,
            Attribute::CursorStyle => writeln!(out, "{}", self.device.state().cursor_style())?,
            Attribute::Keypad => {
                if let Ok(Some(status)) = self.device.keypad_status() {
                    for byte in status.data() {
                        write!(out, "{} ", byte)?;
                    }
                    writeln!(out)?;
                }
            }
            _ => return Err(Error::NotSupported),
        }
        Ok(out)
    }

    /// Apply an attribute write and return the number of bytes consumed
    pub fn store(&mut self, attr: Attribute, input: &[u8]) -> Result<usize, Error<T::Error>> {
        if !attr.is_writable() {
            return Err(Error::NotSupported);
        }

        let result = match attr {
            Attribute::Contrast | Attribute::Backlight | Attribute::CursorStyle => {
                let Some(value) = single_value(input) else {
                    return Err(Error::InvalidArgument);
                };
                match attr {
                    Attribute::Contrast => self.device.set_contrast(value),
                    Attribute::Backlight => self.device.set_backlight(value),
                    _ => self.device.set_cursor_style(value),
                }
            }
            Attribute::CursorPosition => {
                let Some([row, col]) = parse_fields::<2>(input) else {
                    return Err(Error::InvalidArgument);
                };
                let (Ok(col), Ok(row)) = (u8::try_from(col), u8::try_from(row)) else {
                    return Err(Error::InvalidArgument);
                };
                self.device.set_cursor_position(col, row)
            }
            Attribute::Line1 => self.device.set_line(Line::One, input),
            Attribute::Line2 => self.device.set_line(Line::Two, input),
            Attribute::UserCharacter => {
                let Some(values) = parse_fields::<USER_CHAR_LEN>(input) else {
                    return Err(Error::InvalidArgument);
                };
                self.device.define_character(&values)
            }
            Attribute::RawCmd => self.device.raw_command(input).map(|_| ()),
            _ => return Err(Error::NotSupported),
        };

        match result {
            Ok(()) => Ok(input.len()),
            Err(e) if e.is_soft() => {
                warn!("cfa779: {} write not acknowledged", attr.name());
                Ok(input.len())
            }
            Err(e) => Err(e),
        }
    }
}

/// Leading decimal digits of `token`
fn parse_uint(token: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    let mut digits = 0;
    for &byte in token.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.checked_mul(10)?.checked_add(u32::from(byte - b'0'))?;
        digits += 1;
    }
    (digits > 0).then_some(value)
}

/// First `N` whitespace-separated decimal fields; extra fields are ignored
fn parse_fields<const N: usize>(input: &[u8]) -> Option<[u32; N]> {
    let mut tokens = input
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty());

    let mut values = [0u32; N];
    for value in values.iter_mut() {
        *value = parse_uint(tokens.next()?)?;
    }
    Some(values)
}

fn single_value(input: &[u8]) -> Option<u8> {
    let [value] = parse_fields::<1>(input)?;
    u8::try_from(value).ok()
}
