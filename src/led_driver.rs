//! Byte transport to the MC14489B LED driver.

use embedded_hal::spi::{Error as _, SpiDevice};

use crate::display::DisplayFrame;
use crate::{Error, Result};

/// MC14489B on an SPI bus. The [`SpiDevice`] asserts chip select around each `write`,
/// and the chip tells the data register (3 bytes) from the control register (1 byte) by
/// the length of the transfer.
pub struct Mc14489<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Mc14489<SPI> {
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Send one frame: data register first, then control register.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisplayIo`] if either transfer fails.
    pub fn write_frame(&mut self, frame: &DisplayFrame) -> Result<()> {
        self.spi
            .write(&frame.data)
            .map_err(|err| Error::DisplayIo(err.kind()))?;
        self.spi
            .write(&[frame.control])
            .map_err(|err| Error::DisplayIo(err.kind()))
    }
}
