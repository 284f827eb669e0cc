//! SMBus block transfers over an embedded-hal I2C bus
//!
//! Hosts without a native SMBus controller can drive the panel through
//! any [`embedded_hal::i2c::I2c`] implementation. Block write is a plain
//! write of `[command][count][body...]`; block read is a write of
//! `[command]` followed by a repeated-start read of `[count][data...]`.

use embedded_hal::i2c::I2c;

use crate::smbus::{BlockTransport, SmbusConfig, MAX_BLOCK_LEN};

/// Error from SMBus block operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SmbusError<E> {
    /// Underlying I2C bus error
    Bus(E),
    /// Block body or reported count exceeds [`MAX_BLOCK_LEN`]
    BlockTooLong(usize),
}

impl<E> From<E> for SmbusError<E> {
    fn from(e: E) -> Self {
        SmbusError::Bus(e)
    }
}

/// SMBus block adapter over an I2C bus
pub struct SmbusI2c<I2C> {
    i2c: I2C,
    config: SmbusConfig,
}

impl<I2C: I2c> SmbusI2c<I2C> {
    /// Wrap an I2C bus with the default configuration
    pub fn new(i2c: I2C) -> Self {
        Self::with_config(i2c, SmbusConfig::default())
    }

    /// Wrap an I2C bus with an explicit configuration
    pub fn with_config(i2c: I2C, config: SmbusConfig) -> Self {
        Self { i2c, config }
    }

    /// Bus configuration
    pub fn config(&self) -> &SmbusConfig {
        &self.config
    }

    /// Borrow the underlying bus
    pub fn inner(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Release the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> BlockTransport for SmbusI2c<I2C> {
    type Error = SmbusError<I2C::Error>;

    fn write_block(&mut self, address: u8, command: u8, body: &[u8]) -> Result<(), Self::Error> {
        if body.len() > MAX_BLOCK_LEN {
            return Err(SmbusError::BlockTooLong(body.len()));
        }

        let mut frame = [0u8; MAX_BLOCK_LEN + 2];
        frame[0] = command;
        frame[1] = body.len() as u8;
        frame[2..2 + body.len()].copy_from_slice(body);

        self.i2c.write(address, &frame[..2 + body.len()])?;
        Ok(())
    }

    fn read_block(
        &mut self,
        address: u8,
        command: u8,
        buf: &mut [u8],
    ) -> Result<usize, Self::Error> {
        // Count byte plus the largest possible block
        let mut scratch = [0u8; MAX_BLOCK_LEN + 1];
        self.i2c.write_read(address, &[command], &mut scratch)?;

        let count = scratch[0] as usize;
        if count > MAX_BLOCK_LEN {
            return Err(SmbusError::BlockTooLong(count));
        }

        let copied = count.min(buf.len());
        buf[..copied].copy_from_slice(&scratch[1..1 + copied]);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec;
    use std::vec::Vec;

    fn read_response(block: &[u8]) -> Vec<u8> {
        let mut response = vec![0u8; MAX_BLOCK_LEN + 1];
        response[0] = block.len() as u8;
        response[1..1 + block.len()].copy_from_slice(block);
        response
    }

    #[test]
    fn test_write_block_prefixes_command_and_count() {
        let expectations = [I2cTransaction::write(0x20, vec![0x06, 3, 0x64, 0xAB, 0xCD])];
        let mut bus = SmbusI2c::new(I2cMock::new(&expectations));

        bus.write_block(0x20, 0x06, &[0x64, 0xAB, 0xCD]).unwrap();

        bus.inner().done();
    }

    #[test]
    fn test_write_block_rejects_oversized_body() {
        let mut bus = SmbusI2c::new(I2cMock::new(&[]));

        let result = bus.write_block(0x20, 0x01, &[0u8; MAX_BLOCK_LEN + 1]);
        assert_eq!(result, Err(SmbusError::BlockTooLong(MAX_BLOCK_LEN + 1)));

        bus.inner().done();
    }

    #[test]
    fn test_read_block_returns_count_and_data() {
        let expectations = [I2cTransaction::write_read(
            0x20,
            vec![0x08],
            read_response(&[0x08, b'v', b'1', 0x12, 0x34]),
        )];
        let mut bus = SmbusI2c::new(I2cMock::new(&expectations));

        let mut buf = [0u8; MAX_BLOCK_LEN];
        let n = bus.read_block(0x20, 0x08, &mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf[..n], &[0x08, b'v', b'1', 0x12, 0x34]);

        bus.inner().done();
    }

    #[test]
    fn test_read_block_never_overruns_small_buffer() {
        let expectations = [I2cTransaction::write_read(
            0x20,
            vec![0x09],
            read_response(&[1, 2, 3, 4, 5, 6]),
        )];
        let mut bus = SmbusI2c::new(I2cMock::new(&expectations));

        let mut buf = [0u8; 4];
        let n = bus.read_block(0x20, 0x09, &mut buf).unwrap();
        assert_eq!(n, 6);
        assert_eq!(buf, [1, 2, 3, 4]);

        bus.inner().done();
    }

    #[test]
    fn test_read_block_bad_count() {
        let mut response = vec![0u8; MAX_BLOCK_LEN + 1];
        response[0] = 0xFF;
        let expectations = [I2cTransaction::write_read(0x20, vec![0x00], response)];
        let mut bus = SmbusI2c::new(I2cMock::new(&expectations));

        let mut buf = [0u8; MAX_BLOCK_LEN];
        let result = bus.read_block(0x20, 0x00, &mut buf);
        assert_eq!(result, Err(SmbusError::BlockTooLong(0xFF)));

        bus.inner().done();
    }

    #[test]
    fn test_bus_error_is_wrapped() {
        let expectations = [I2cTransaction::write(0x20, vec![0x07, 0]).with_error(ErrorKind::Other)];
        let mut bus = SmbusI2c::new(I2cMock::new(&expectations));

        let result = bus.write_block(0x20, 0x07, &[]);
        assert_eq!(result, Err(SmbusError::Bus(ErrorKind::Other)));

        bus.inner().done();
    }
}
