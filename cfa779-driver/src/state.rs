//! Shadow device state
//!
//! The panel cannot report its settings back, so the driver remembers the
//! last value it sent. One `DeviceState` lives for one device session.

use cfa779_protocol::commands::UNSET;

/// Last-commanded display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    backlight: u8,
    contrast: u8,
    cursor_style: u8,
    cursor_position: Option<(u8, u8)>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    /// Fresh session state, every setting [`UNSET`]
    pub const fn new() -> Self {
        Self {
            backlight: UNSET,
            contrast: UNSET,
            cursor_style: UNSET,
            cursor_position: None,
        }
    }

    /// Backlight (0-100), or 255 if never set
    pub fn backlight(&self) -> u8 {
        self.backlight
    }

    /// Contrast (0-200), or 255 if never set
    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Cursor style (0-3), or 255 if never set
    pub fn cursor_style(&self) -> u8 {
        self.cursor_style
    }

    /// Cursor position as `(col, row)`
    pub fn cursor_position(&self) -> Option<(u8, u8)> {
        self.cursor_position
    }

    /// Whether backlight, contrast and cursor style have all been written
    pub fn is_initialized(&self) -> bool {
        self.backlight != UNSET && self.contrast != UNSET && self.cursor_style != UNSET
    }

    pub(crate) fn set_backlight(&mut self, value: u8) {
        self.backlight = value;
    }

    pub(crate) fn set_contrast(&mut self, value: u8) {
        self.contrast = value;
    }

    pub(crate) fn set_cursor_style(&mut self, value: u8) {
        self.cursor_style = value;
    }

    pub(crate) fn set_cursor_position(&mut self, col: u8, row: u8) {
        self.cursor_position = Some((col, row));
    }
}
