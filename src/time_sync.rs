//! Network time acquisition with a two-tier retry interval.
//!
//! [`TimeSync::acquire`] makes exactly one attempt and records the outcome in a
//! [`SyncState`]: the next sync is due 300 s after a success and 10 s after a failure.
//! Scheduling the retries is the caller's job (see
//! [`ClockController`](crate::controller::ClockController)).

#![allow(clippy::future_not_send, reason = "single-threaded")]

#[cfg(feature = "defmt")]
use defmt::{info, warn};
use embassy_time::{Duration, Instant};
use time::UtcOffset;

use crate::config::{FAILURE_RETRY_INTERVAL, SUCCESS_RESYNC_INTERVAL};
use crate::unix_seconds::UnixSeconds;
use crate::wall_time::WallTime;
use crate::{Error, Result};

/// Something that can fetch the current absolute time, or say why it could not.
#[allow(async_fn_in_trait, reason = "single-threaded executor, no Send bound needed")]
pub trait TimeSource {
    /// One fetch attempt. No retries.
    async fn fetch_unix_seconds(&mut self) -> Result<UnixSeconds, &'static str>;
}

impl<T: TimeSource> TimeSource for &mut T {
    async fn fetch_unix_seconds(&mut self) -> Result<UnixSeconds, &'static str> {
        (**self).fetch_unix_seconds().await
    }
}

/// When the last acquisition was attempted and how long to wait before the next one.
///
/// The retry interval is always either [`SUCCESS_RESYNC_INTERVAL`] or
/// [`FAILURE_RETRY_INTERVAL`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncState {
    last_sync: Option<Instant>,
    retry_interval: Duration,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    /// Never attempted, so immediately due.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_sync: None,
            retry_interval: FAILURE_RETRY_INTERVAL,
        }
    }

    /// Time of the latest attempt, successful or not.
    #[must_use]
    pub const fn last_sync(&self) -> Option<Instant> {
        self.last_sync
    }

    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Whether strictly more than the retry interval has passed since the last attempt.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_sync.is_none_or(|last_sync| {
            now.checked_duration_since(last_sync)
                .is_some_and(|elapsed| elapsed > self.retry_interval)
        })
    }

    fn record(&mut self, now: Instant, succeeded: bool) {
        self.last_sync = Some(now);
        self.retry_interval = if succeeded {
            SUCCESS_RESYNC_INTERVAL
        } else {
            FAILURE_RETRY_INTERVAL
        };
    }
}

/// Wraps a [`TimeSource`] and keeps the [`SyncState`] bookkeeping in one place.
pub struct TimeSync<S> {
    source: S,
}

impl<S: TimeSource> TimeSync<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Try once to get the time as local wall time at `utc_offset`, recording the attempt
    /// at `now` in `sync_state`. A fetched time that cannot be shown at that offset counts
    /// as a failed attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NetworkTimeUnavailable`] if the fetch or the conversion fails. No
    /// other error is possible.
    pub async fn acquire(
        &mut self,
        sync_state: &mut SyncState,
        now: Instant,
        utc_offset: UtcOffset,
    ) -> Result<WallTime> {
        let fetched = self.source.fetch_unix_seconds().await.and_then(|unix_seconds| {
            unix_seconds
                .to_wall_time(utc_offset)
                .ok_or("Network time out of range")
        });
        match fetched {
            Ok(wall_time) => {
                sync_state.record(now, true);
                #[cfg(feature = "defmt")]
                info!(
                    "Time synced: {:?}; next sync in {}s",
                    wall_time,
                    sync_state.retry_interval().as_secs()
                );
                Ok(wall_time)
            }
            Err(reason) => {
                sync_state.record(now, false);
                #[cfg(feature = "defmt")]
                warn!(
                    "Time sync failed: {}; retrying in {}s",
                    reason,
                    sync_state.retry_interval().as_secs()
                );
                Err(Error::NetworkTimeUnavailable(reason))
            }
        }
    }
}

// ============================================================================
// Network Time Protocol (NTP) source over WiFi
// ============================================================================

#[cfg(feature = "wifi")]
mod ntp {
    use defmt::{info, warn};
    use embassy_net::{Stack, dns, udp};
    use embassy_sync::once_lock::OnceLock;
    use embassy_time::Duration;

    use super::TimeSource;
    use crate::unix_seconds::UnixSeconds;

    // Network Time Protocol (NTP) server configuration
    const NTP_SERVER: &str = "pool.ntp.org";
    const NTP_PORT: u16 = 123;
    const NTP_TIMEOUT: Duration = Duration::from_secs(5);
    const NTP_PACKET_LEN: usize = 48;
    const TRANSMIT_TIMESTAMP: core::ops::Range<usize> = 40..44;

    /// [`TimeSource`] that asks `pool.ntp.org` over the WiFi network stack.
    ///
    /// The stack is published by [`wifi::join`](crate::wifi::join) once the network is up;
    /// fetches wait for it.
    pub struct NtpTimeSource {
        stack: &'static OnceLock<Stack<'static>>,
    }

    impl NtpTimeSource {
        #[must_use]
        pub const fn new(stack: &'static OnceLock<Stack<'static>>) -> Self {
            Self { stack }
        }
    }

    impl TimeSource for NtpTimeSource {
        async fn fetch_unix_seconds(&mut self) -> Result<UnixSeconds, &'static str> {
            let stack = *self.stack.get().await;
            fetch_ntp_time(stack).await
        }
    }

    async fn fetch_ntp_time(stack: Stack<'static>) -> Result<UnixSeconds, &'static str> {
        use dns::DnsQueryType;
        use udp::UdpSocket;

        // DNS lookup
        info!("Resolving Network Time Protocol (NTP) host {}...", NTP_SERVER);
        let dns_result = stack
            .dns_query(NTP_SERVER, DnsQueryType::A)
            .await
            .map_err(|e| {
                warn!("DNS lookup failed: {:?}", e);
                "DNS lookup failed"
            })?;
        let server_addr = dns_result.first().ok_or("No DNS results")?;

        info!("Network Time Protocol (NTP) server IP: {}", server_addr);

        // Create UDP socket
        let mut rx_meta = [udp::PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0; 128];
        let mut tx_meta = [udp::PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0; 128];
        let mut socket = UdpSocket::new(
            stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );

        socket.bind(0).map_err(|e| {
            warn!("Socket bind failed: {:?}", e);
            "Socket bind failed"
        })?;

        // 48-byte request: LI=0, VN=3, Mode=3 (client), everything else zero
        let mut ntp_request = [0u8; NTP_PACKET_LEN];
        if let Some(flags) = ntp_request.first_mut() {
            *flags = 0x1B;
        }

        socket
            .send_to(&ntp_request, (*server_addr, NTP_PORT))
            .await
            .map_err(|e| {
                warn!("Network Time Protocol (NTP) send failed: {:?}", e);
                "NTP send failed"
            })?;

        // Receive response with timeout
        let mut response = [0u8; NTP_PACKET_LEN];
        let (n, _from) = embassy_time::with_timeout(NTP_TIMEOUT, socket.recv_from(&mut response))
            .await
            .map_err(|_| "NTP receive timeout")?
            .map_err(|e| {
                warn!("Network Time Protocol (NTP) receive failed: {:?}", e);
                "NTP receive failed"
            })?;

        if n < NTP_PACKET_LEN {
            return Err("NTP response too short");
        }

        // Transmit timestamp, integer seconds (big-endian)
        let transmit_seconds: [u8; 4] = response
            .get(TRANSMIT_TIMESTAMP)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or("NTP response too short")?;
        let ntp_seconds = u32::from_be_bytes(transmit_seconds);

        Ok(UnixSeconds::from_ntp_seconds(ntp_seconds))
    }
}

#[cfg(feature = "wifi")]
pub use ntp::NtpTimeSource;
