//! Build-time configuration and timing constants.
//!
//! `build.rs` injects `WIFI_SSID`, `WIFI_PASS` and `UTC_OFFSET_MINUTES` (from the
//! environment or a `.env` file) as compile-time values.

use embassy_time::Duration;
use time::UtcOffset;

use crate::{Error, Result};

pub use crate::display::DAYLIGHT_SAVING_OFFSET_HOURS;

/// Next sync after a successful one.
pub const SUCCESS_RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Next sync after a failed one.
pub const FAILURE_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Pause between attempts of the mandatory first sync.
pub const INITIAL_SYNC_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How often the running clock polls the RTC. Well under a second so the separator
/// blinks on time.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Pause between WiFi join attempts.
pub const WIFI_JOIN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// WiFi network credentials (SSID and password).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    /// Network SSID (up to 32 characters).
    pub ssid: heapless::String<32>,
    /// Network password (up to 64 characters).
    pub password: heapless::String<64>,
}

impl WifiCredentials {
    /// # Errors
    ///
    /// Returns [`Error::CredentialsMissing`] for an empty SSID and
    /// [`Error::CredentialsTooLong`] if either value does not fit.
    pub fn new(ssid: &str, password: &str) -> Result<Self> {
        if ssid.is_empty() {
            return Err(Error::CredentialsMissing);
        }
        Ok(Self {
            ssid: heapless::String::try_from(ssid).map_err(|()| Error::CredentialsTooLong)?,
            password: heapless::String::try_from(password)
                .map_err(|()| Error::CredentialsTooLong)?,
        })
    }

    /// Credentials baked in by `build.rs`.
    ///
    /// # Errors
    ///
    /// See [`WifiCredentials::new`].
    pub fn from_build_env() -> Result<Self> {
        Self::new(env!("WIFI_SSID"), env!("WIFI_PASS"))
    }
}

/// Parse a UTC offset given in minutes, e.g. `"-480"` for PST.
///
/// # Errors
///
/// Returns [`Error::InvalidUtcOffset`] if the text is not an integer or is outside ±25 hours.
pub fn parse_utc_offset(minutes: &str) -> Result<UtcOffset> {
    let minutes: i32 = minutes
        .trim()
        .parse()
        .map_err(|_| Error::InvalidUtcOffset)?;
    let seconds = minutes.checked_mul(60).ok_or(Error::InvalidUtcOffset)?;
    UtcOffset::from_whole_seconds(seconds).map_err(|_| Error::InvalidUtcOffset)
}

/// The offset baked in by `build.rs` (`UTC_OFFSET_MINUTES`, default 0).
///
/// # Errors
///
/// See [`parse_utc_offset`].
pub fn utc_offset_from_build_env() -> Result<UtcOffset> {
    parse_utc_offset(env!("UTC_OFFSET_MINUTES"))
}
