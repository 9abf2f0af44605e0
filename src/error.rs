use derive_more::derive::{Display, Error};
use embedded_hal::{digital, i2c, spi};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Only [`Error::NetworkTimeUnavailable`] is recoverable: the controller absorbs it and
/// shortens the next retry. Hardware I/O errors and configuration errors reach the
/// firmware entry point.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// The network time fetch failed (DNS, socket, timeout, bad reply, ...).
    #[display("network time unavailable: {_0}")]
    NetworkTimeUnavailable(#[error(not(source))] &'static str),

    /// Reading or writing the real-time-clock chip failed.
    #[display("real-time clock I/O failed: {_0:?}")]
    RtcIo(#[error(not(source))] i2c::ErrorKind),

    /// Writing a frame to the LED driver failed.
    #[display("LED driver I/O failed: {_0:?}")]
    DisplayIo(#[error(not(source))] spi::ErrorKind),

    /// Reading an option switch failed.
    #[display("option switch read failed: {_0:?}")]
    SwitchIo(#[error(not(source))] digital::ErrorKind),

    #[display("WiFi credentials are missing (set WIFI_SSID and WIFI_PASS)")]
    CredentialsMissing,

    #[display("WiFi credentials are too long (SSID <= 32, password <= 64 bytes)")]
    CredentialsTooLong,

    #[display("invalid wall time {hour:02}:{minute:02}:{second:02}")]
    InvalidWallTime { hour: u8, minute: u8, second: u8 },

    #[display("UTC_OFFSET_MINUTES is not a valid offset")]
    InvalidUtcOffset,

    // `#[error(not(source))]` below tells `derive_more` that `embassy_executor::SpawnError` does
    // not implement Rust's `core::error::Error` trait.
    #[cfg(feature = "pico1")]
    #[display("{_0:?}")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),
}

#[cfg(feature = "pico1")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(err)
    }
}
