//! A device abstraction for a DS1307 battery-backed real-time clock on I2C.
//!
//! The chip is the authoritative "current time" once set. Only the first three registers
//! (seconds, minutes, hours, in that order) are used, all in BCD.
//!
//! See [`RealTimeClock`] for usage.

use embedded_hal::i2c::{Error as _, I2c};

use crate::bcd;
use crate::wall_time::WallTime;
use crate::{Error, Result};

/// Fixed 7-bit I2C address of the DS1307.
pub const DS1307_ADDRESS: u8 = 0x68;

/// Register offset of the seconds register; minutes and hours follow.
const TIME_REGISTER: u8 = 0x00;

/// Clock-halt flag in the seconds register. While set, the oscillator is stopped.
const CLOCK_HALT: u8 = 0b_1000_0000;

/// Hours register bits other than the BCD hour (12/24 select, AM/PM).
const HOURS_MASK: u8 = 0b_0011_1111;

/// A device abstraction for the DS1307 real-time clock.
///
/// No retries happen here: any bus fault is returned as [`Error::RtcIo`].
///
/// # Example
///
/// ```
/// # use core::convert::Infallible;
/// # use embedded_hal::i2c::{ErrorType, I2c, Operation};
/// # struct Bus;
/// # impl ErrorType for Bus { type Error = Infallible; }
/// # impl I2c for Bus {
/// #     fn transaction(&mut self, _: u8, ops: &mut [Operation<'_>]) -> Result<(), Infallible> {
/// #         for op in ops {
/// #             if let Operation::Read(buf) = op { buf.copy_from_slice(&[0x04, 0x05, 0x09]); }
/// #         }
/// #         Ok(())
/// #     }
/// # }
/// use led_clock::rtc::RealTimeClock;
///
/// let mut rtc = RealTimeClock::new(Bus);
/// let now = rtc.get()?;
/// assert_eq!((now.hour(), now.minute(), now.second()), (9, 5, 4));
/// # Ok::<(), led_clock::Error>(())
/// ```
pub struct RealTimeClock<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> RealTimeClock<I2C> {
    /// Wrap an I2C bus that has a DS1307 at [`DS1307_ADDRESS`].
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Read the current time of day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcIo`] if the bus transfer fails, or [`Error::InvalidWallTime`]
    /// if the chip holds a value outside the day (e.g. never initialized).
    pub fn get(&mut self) -> Result<WallTime> {
        let mut raw = [0_u8; 3];
        self.i2c
            .write_read(DS1307_ADDRESS, &[TIME_REGISTER], &mut raw)
            .map_err(|err| Error::RtcIo(err.kind()))?;
        let [seconds, minutes, hours] = raw;
        WallTime::new(
            bcd::decode(hours & HOURS_MASK),
            bcd::decode(minutes),
            bcd::decode(seconds & !CLOCK_HALT),
        )
    }

    /// Write a time of day. All three registers go out in a single bus transaction, so a
    /// later [`get`](Self::get) never observes a partial update.
    ///
    /// Writing the seconds register also clears the clock-halt flag, which starts the
    /// oscillator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcIo`] if the bus transfer fails.
    pub fn set(&mut self, time: WallTime) -> Result<()> {
        let frame = [
            TIME_REGISTER,
            bcd::encode(time.second()),
            bcd::encode(time.minute()),
            bcd::encode(time.hour()),
        ];
        self.i2c
            .write(DS1307_ADDRESS, &frame)
            .map_err(|err| Error::RtcIo(err.kind()))
    }

    /// Start the oscillator without changing the stored time.
    ///
    /// A fresh DS1307 powers up halted; until the first network sync this keeps the
    /// battery-backed time ticking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RtcIo`] if the bus transfer fails.
    pub fn start(&mut self) -> Result<()> {
        let mut seconds = [0_u8; 1];
        self.i2c
            .write_read(DS1307_ADDRESS, &[TIME_REGISTER], &mut seconds)
            .map_err(|err| Error::RtcIo(err.kind()))?;
        let [seconds] = seconds;
        if seconds & CLOCK_HALT == 0 {
            return Ok(());
        }
        self.i2c
            .write(DS1307_ADDRESS, &[TIME_REGISTER, seconds & !CLOCK_HALT])
            .map_err(|err| Error::RtcIo(err.kind()))
    }
}
