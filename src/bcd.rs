//! Binary-coded decimal helpers for the real-time-clock wire format.
//!
//! Each register byte carries the tens digit in the high nibble and the units digit
//! in the low nibble, so `0x59` means 59.

/// Collapse a BCD byte to its decimal value.
///
/// Both nibbles are expected to be 0-9; the chip is trusted to send valid BCD.
///
/// ```
/// assert_eq!(led_clock::bcd::decode(0x59), 59);
/// ```
#[must_use]
#[expect(
    clippy::arithmetic_side_effects,
    reason = "byte >= 16 * (byte >> 4), so the subtraction cannot underflow"
)]
pub const fn decode(byte: u8) -> u8 {
    byte - 6 * (byte >> 4)
}

/// Pack a decimal value (0-99) into a BCD byte.
#[must_use]
#[expect(
    clippy::integer_division_remainder_used,
    clippy::arithmetic_side_effects,
    reason = "value / 10 is at most 25, so 6 * (value / 10) fits in u8"
)]
pub const fn encode(value: u8) -> u8 {
    value.wrapping_add(6 * (value / 10))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};

    #[test]
    fn round_trips_every_clock_value() {
        for value in 0..=59 {
            assert_eq!(decode(encode(value)), value, "value {value}");
        }
    }

    #[test]
    fn matches_nibble_layout() {
        assert_eq!(encode(0), 0x00);
        assert_eq!(encode(9), 0x09);
        assert_eq!(encode(10), 0x10);
        assert_eq!(encode(23), 0x23);
        assert_eq!(encode(99), 0x99);
        assert_eq!(decode(0x45), 45);
        assert_eq!(decode(0x99), 99);
    }
}
