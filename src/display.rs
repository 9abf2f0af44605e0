//! Encoding of a time of day into MC14489B register frames.
//!
//! The driver's 24-bit data register is laid out as
//!
//! ```text
//! byte 0: [brightness | dp dp dp | bank 5]
//! byte 1: [bank 4     | bank 3         ]
//! byte 2: [bank 2     | bank 1         ]
//! ```
//!
//! The clock uses banks 4..1 for `H H M M` and the three decimal points for the separator.
//! The control register selects per-bank "special decode"; with special decode a `0` nibble
//! shows as blank, which is how the leading hour digit is suppressed.
//!
//! Everything here is pure: identical inputs always produce identical frames.

use crate::options::OptionSet;
use crate::wall_time::WallTime;

/// Hours added when daylight saving is on.
pub const DAYLIGHT_SAVING_OFFSET_HOURS: u8 = 1;

/// Top bit of data byte 0. The driver needs it set (full brightness).
const DATA_MARKER: u8 = 0b_1000_0000;

/// Decimal-point bits in data byte 0 that form the separator.
const SEPARATOR_SEGMENTS: u8 = 0b_0111_0000;

/// Control register for the numeric display: normal mode, hex decode on every bank.
const CONTROL_BASE: u8 = 0b_1100_0001;

/// Special decode on bank 4 (tens of hours), so a zero there is blank.
pub const LEADING_DIGIT_BLANK: u8 = 0b_0001_0000;

/// One render: the 3-byte data register and the 1-byte control register, sent as two
/// separate chip-select-framed transfers.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFrame {
    pub data: [u8; 3],
    pub control: u8,
}

impl DisplayFrame {
    /// "SYnc", shown while the time is being fetched at startup.
    pub const SYNCING: Self = Self {
        data: [0b_1000_0000, 0b_0101_1100, 0b_0110_0001],
        control: 0b_1100_1111,
    };

    /// "Conn", shown while joining the WiFi network.
    pub const CONNECTING: Self = Self {
        data: [0b_1000_0000, 0b_1100_0111, 0b_0110_0110],
        control: 0b_1100_1111,
    };

    /// Encode a time of day under the given options.
    ///
    /// ```
    /// use led_clock::display::DisplayFrame;
    /// use led_clock::options::OptionSet;
    /// use led_clock::wall_time::WallTime;
    ///
    /// let options = OptionSet { flash_separator: true, ..OptionSet::default() };
    /// let frame = DisplayFrame::encode(WallTime::new(9, 5, 4)?, options);
    /// assert_eq!(frame.data, [0x80, 0x09, 0x05]);
    /// assert_eq!(frame.control, 0xD1); // leading "0" blanked
    /// # Ok::<(), led_clock::Error>(())
    /// ```
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "digit extraction from values below 24 and 60"
    )]
    pub const fn encode(time: WallTime, options: OptionSet) -> Self {
        let hour = apply_daylight_saving(
            time.hour(),
            options.daylight_saving,
            DAYLIGHT_SAVING_OFFSET_HOURS,
        );
        let hour = apply_hour_mode(hour, options.twelve_hour_mode);
        let minute = time.minute();

        let bank_a = hour / 10;
        let bank_b = hour % 10;
        let bank_c = minute / 10;
        let bank_d = minute % 10;

        let separator = if separator_on(time.second(), options.flash_separator) {
            SEPARATOR_SEGMENTS
        } else {
            0
        };

        let mut control = CONTROL_BASE;
        if bank_a == 0 && !options.leading_zero {
            control |= LEADING_DIGIT_BLANK;
        }

        Self {
            data: [
                DATA_MARKER | separator,
                (bank_a << 4) | bank_b,
                (bank_c << 4) | bank_d,
            ],
            control,
        }
    }
}

/// Shift the hour forward by `offset_hours` when daylight saving is on, wrapping at
/// midnight.
#[must_use]
#[expect(
    clippy::integer_division_remainder_used,
    clippy::arithmetic_side_effects,
    reason = "hour < 24 and a small offset cannot overflow u8"
)]
pub const fn apply_daylight_saving(hour: u8, enabled: bool, offset_hours: u8) -> u8 {
    if enabled {
        (hour + offset_hours) % 24
    } else {
        hour
    }
}

/// Fold afternoon hours onto 1-11 in 12-hour mode. Midnight stays 0 and noon stays 12.
#[must_use]
#[expect(clippy::arithmetic_side_effects, reason = "hour > 12 before subtracting")]
pub const fn apply_hour_mode(hour: u8, twelve_hour: bool) -> u8 {
    if twelve_hour && hour > 12 {
        hour - 12
    } else {
        hour
    }
}

/// Whether the separator is lit for this second: it follows the parity of the second when
/// flashing and is steady otherwise.
#[must_use]
#[expect(clippy::integer_division_remainder_used, reason = "parity")]
pub const fn separator_on(second: u8, flash: bool) -> bool {
    !flash || second % 2 == 1
}
