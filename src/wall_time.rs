//! Time-of-day value shared by the real-time clock, the controller and the display encoder.

use crate::{Error, Result};

/// Hour, minute and second of the day (24-hour).
///
/// Construct through [`WallTime::new`], which rejects out-of-range fields, so every
/// `WallTime` the encoder sees is valid. Equality is structural; the controller uses it
/// to tell whether the displayed second changed.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl WallTime {
    /// Midnight.
    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Create a time of day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWallTime`] unless `hour < 24`, `minute < 60` and `second < 60`.
    pub const fn new(hour: u8, minute: u8, second: u8) -> Result<Self> {
        if hour < 24 && minute < 60 && second < 60 {
            Ok(Self {
                hour,
                minute,
                second,
            })
        } else {
            Err(Error::InvalidWallTime {
                hour,
                minute,
                second,
            })
        }
    }

    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }

    #[must_use]
    pub const fn second(self) -> u8 {
        self.second
    }
}
