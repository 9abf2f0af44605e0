//! Unix timestamp type for the network time source

use time::{OffsetDateTime, UtcOffset};

use crate::wall_time::WallTime;

/// Units-safe wrapper for Unix timestamps (seconds since 1970-01-01 00:00:00 UTC)
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnixSeconds(pub i64);

impl UnixSeconds {
    /// Get the underlying i64 value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Convert NTP seconds (since 1900-01-01) to Unix seconds (since 1970-01-01).
    ///
    /// The 32-bit NTP seconds counter wraps on 2036-02-07 06:28:16 UTC. A reading below the
    /// 1900→1970 offset can only come from after that wrap, so it is placed in the next era.
    #[must_use]
    pub fn from_ntp_seconds(ntp: u32) -> Self {
        // 1900→1970 offset: 70 years * 365.25 days/year * 86400 seconds/day
        const NTP_TO_UNIX_SECONDS: u32 = 2_208_988_800;
        const NTP_ERA_SECONDS: i64 = 1 << 32;
        let era_start = if ntp < NTP_TO_UNIX_SECONDS {
            NTP_ERA_SECONDS
        } else {
            0
        };
        Self(
            era_start
                .wrapping_add(i64::from(ntp))
                .wrapping_sub(i64::from(NTP_TO_UNIX_SECONDS)),
        )
    }

    /// Convert to OffsetDateTime with the given timezone offset
    #[must_use]
    pub fn to_offset_datetime(self, offset: UtcOffset) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.as_i64())
            .ok()
            .and_then(|dt| dt.checked_to_offset(offset))
    }

    /// Local time of day at the given UTC offset, ready to be written to the RTC.
    #[must_use]
    pub fn to_wall_time(self, offset: UtcOffset) -> Option<WallTime> {
        let local = self.to_offset_datetime(offset)?;
        WallTime::new(local.hour(), local.minute(), local.second()).ok()
    }
}
