//! SMBus block transfer abstraction
//!
//! Provides the transport contract used by the CFA-779 driver. Calls are
//! synchronous and blocking; the caller guarantees at most one command is
//! in flight per device.

/// Largest block an SMBus block transfer can carry
pub const MAX_BLOCK_LEN: usize = 32;

/// Default 7-bit address of the CFA-779
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// SMBus block transport
///
/// The command code travels out-of-band (as the SMBus command byte), so
/// `body` and the read buffer only hold the block contents.
pub trait BlockTransport {
    /// Error type for bus operations
    type Error;

    /// Send `body` as a block tagged with `command`
    ///
    /// The declared block length is `body.len()`.
    ///
    /// # Arguments
    /// * `address` - 7-bit device address
    /// * `command` - SMBus command code
    /// * `body` - Block contents (at most [`MAX_BLOCK_LEN`] bytes)
    fn write_block(&mut self, address: u8, command: u8, body: &[u8]) -> Result<(), Self::Error>;

    /// Read the block tagged with `command` into `buf`
    ///
    /// Returns the byte count reported by the device. Implementations never
    /// write past `buf`, but may report a count larger than `buf.len()` so
    /// the caller can detect an oversized reply.
    fn read_block(&mut self, address: u8, command: u8, buf: &mut [u8])
        -> Result<usize, Self::Error>;
}

impl<T: BlockTransport + ?Sized> BlockTransport for &mut T {
    type Error = T::Error;

    fn write_block(&mut self, address: u8, command: u8, body: &[u8]) -> Result<(), Self::Error> {
        T::write_block(self, address, command, body)
    }

    fn read_block(
        &mut self,
        address: u8,
        command: u8,
        buf: &mut [u8],
    ) -> Result<usize, Self::Error> {
        T::read_block(self, address, command, buf)
    }
}

/// SMBus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmbusConfig {
    /// 7-bit device address
    pub address: u8,
}

impl Default for SmbusConfig {
    fn default() -> Self {
        Self::at(DEFAULT_ADDRESS)
    }
}

impl SmbusConfig {
    /// Standard configuration at a custom address
    pub const fn at(address: u8) -> Self {
        Self { address }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SmbusConfig::default();
        assert_eq!(config.address, 0x20);
        assert_eq!(SmbusConfig::at(0x21).address, 0x21);
    }
}
