//! Driver configuration
//!
//! Defaults reproduce the classic driver behavior: 100 ms keypad polling,
//! optimistic writes, level-triggered key events and no raw command access.

use cfa779_protocol::commands::NUM_KEYS;
use cfa779_protocol::Key;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default keypad poll interval
pub const POLL_INTERVAL_DEFAULT_MS: u32 = 100;

/// How setter replies are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValidationPolicy {
    /// Setters send and trust the write; queries log echo/length mismatches
    #[default]
    Lenient,
    /// Every command reads its reply; echo or length mismatch is an error
    Strict,
}

impl ValidationPolicy {
    pub fn is_strict(self) -> bool {
        self == ValidationPolicy::Strict
    }
}

/// Keypad event generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum KeypadMode {
    /// Re-emit every cycle the status reports a key (repeat while held)
    #[default]
    Level,
    /// Emit only on transitions of the per-key held state
    Edge,
}

/// Driver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverConfig {
    /// Keypad poll interval in milliseconds
    pub poll_interval_ms: u32,
    /// Reply handling for setters
    pub policy: ValidationPolicy,
    /// Keypad event generation
    pub keypad_mode: KeypadMode,
    /// Key reported for each keypad slot
    pub keymap: [Key; NUM_KEYS],
    /// Expose the raw command passthrough
    pub rawcmd: bool,
    /// Log every transfer and key event
    pub debug: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_DEFAULT_MS,
            policy: ValidationPolicy::Lenient,
            keypad_mode: KeypadMode::Level,
            keymap: Key::ALL,
            rawcmd: false,
            debug: false,
        }
    }
}

impl DriverConfig {
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_keypad_mode(mut self, mode: KeypadMode) -> Self {
        self.keypad_mode = mode;
        self
    }

    pub fn with_keymap(mut self, keymap: [Key; NUM_KEYS]) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn with_rawcmd(mut self, enabled: bool) -> Self {
        self.rawcmd = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.policy, ValidationPolicy::Lenient);
        assert_eq!(config.keypad_mode, KeypadMode::Level);
        assert_eq!(config.keymap, Key::ALL);
        assert!(!config.rawcmd);
    }

    #[test]
    fn test_builder() {
        let config = DriverConfig::default()
            .with_policy(ValidationPolicy::Strict)
            .with_rawcmd(true)
            .with_poll_interval_ms(250);
        assert!(config.policy.is_strict());
        assert!(config.rawcmd);
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_toml() {
        let config: DriverConfig = toml::from_str(
            r#"
            poll_interval_ms = 50
            policy = "strict"
            keypad_mode = "edge"
            keymap = ["down", "up", "left", "right", "enter"]
            rawcmd = true
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.policy, ValidationPolicy::Strict);
        assert_eq!(config.keypad_mode, KeypadMode::Edge);
        assert_eq!(config.keymap[0], Key::Down);
        assert!(config.rawcmd);
        // Unspecified fields keep their defaults
        assert!(!config.debug);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_empty_toml_is_default() {
        let config: DriverConfig = toml::from_str("").unwrap();
        assert_eq!(config, DriverConfig::default());
    }
}
