//! The clock's state machine: connect, sync, then keep the display current.
//!
//! ```text
//! Connecting ──► Syncing ──► Running ─┐
//!   "Conn"        "SYnc"       ▲      │ tick: read RTC, render if the second changed;
//!                              └──────┘ a due re-sync runs alongside the ticks
//! ```
//!
//! `Connecting` and `Syncing` block until they succeed. In `Running` a re-sync never holds
//! up a render: ticks continue while the fetch is in flight. A failed re-sync leaves the
//! RTC on its old time and the next attempt comes 10 s later.
//!
//! See [`ClockController`] for usage.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::convert::Infallible;
use core::future::Future;

#[cfg(feature = "defmt")]
use defmt::{debug, info};
use embassy_futures::select::{Either, select};
use embassy_time::Instant;
use embedded_hal::digital::InputPin;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;
use embedded_hal_async::delay::DelayNs;
use time::UtcOffset;

use crate::config::{INITIAL_SYNC_RETRY_DELAY, POLL_INTERVAL};
use crate::display::DisplayFrame;
use crate::led_driver::Mc14489;
use crate::options::OptionBindings;
use crate::rtc::RealTimeClock;
use crate::time_sync::{SyncState, TimeSource, TimeSync};
use crate::wall_time::WallTime;
use crate::{Error, Result};

/// Source of "now" for sync scheduling. Only differences between readings matter.
pub trait Monotonic {
    fn now(&self) -> Instant;
}

impl<M: Monotonic> Monotonic for &M {
    fn now(&self) -> Instant {
        M::now(self)
    }
}

/// [`Monotonic`] backed by the embassy time driver (time since boot).
#[cfg(feature = "pico1")]
pub struct Uptime;

#[cfg(feature = "pico1")]
impl Monotonic for Uptime {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Phases of the controller. There is no terminal state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Waiting for the network; shows "Conn".
    Connecting,
    /// Waiting for the first time fetch; shows "SYnc".
    Syncing,
    /// Showing the time.
    Running,
}

/// What one [`ClockController::tick`] did.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// The RTC moved on; this frame went to the driver.
    Rendered(WallTime, DisplayFrame),
    /// Same second as the last render; nothing was written.
    Unchanged(WallTime),
}

/// The hardware the controller drives: the single owned context that holds the RTC,
/// the LED driver and the option switches.
pub struct ClockHardware<I2C, SPI, P> {
    pub rtc: RealTimeClock<I2C>,
    pub display: Mc14489<SPI>,
    pub options: OptionBindings<P>,
}

impl<I2C, SPI, P> ClockHardware<I2C, SPI, P>
where
    I2C: I2c,
    SPI: SpiDevice,
    P: InputPin,
{
    fn render(&mut self, last_rendered: &mut Option<WallTime>) -> Result<Tick> {
        let now = self.rtc.get()?;
        if *last_rendered == Some(now) {
            return Ok(Tick::Unchanged(now));
        }

        let options = self.options.read()?;
        let frame = DisplayFrame::encode(now, options);
        self.display.write_frame(&frame)?;
        *last_rendered = Some(now);
        #[cfg(feature = "defmt")]
        debug!("Rendered {:?} with {:?}", now, options);
        Ok(Tick::Rendered(now, frame))
    }

    /// Render once per poll interval until the hardware fails.
    async fn render_until_fault<D: DelayNs>(
        &mut self,
        last_rendered: &mut Option<WallTime>,
        delay: &mut D,
    ) -> Error {
        loop {
            if let Err(err) = self.render(last_rendered) {
                return err;
            }
            delay.delay_ms(poll_interval_ms()).await;
        }
    }
}

/// Orchestrates time acquisition, the RTC and the display.
///
/// # Example
///
/// ```ignore
/// let hardware = ClockHardware { rtc, display, options };
/// let mut controller = ClockController::new(hardware, TimeSync::new(source), Uptime, utc_offset);
/// // Shows "Conn" until `join` finishes, "SYnc" until the first fetch succeeds, then the time.
/// let err = controller.run(join, Delay).await.unwrap_err();
/// ```
pub struct ClockController<I2C, SPI, P, S, M> {
    hardware: ClockHardware<I2C, SPI, P>,
    time_sync: TimeSync<S>,
    monotonic: M,
    utc_offset: UtcOffset,
    state: ClockState,
    sync_state: SyncState,
    last_rendered: Option<WallTime>,
}

impl<I2C, SPI, P, S, M> ClockController<I2C, SPI, P, S, M>
where
    I2C: I2c,
    SPI: SpiDevice,
    P: InputPin,
    S: TimeSource,
    M: Monotonic,
{
    /// `utc_offset` is applied to network time before it is written to the RTC.
    pub const fn new(
        hardware: ClockHardware<I2C, SPI, P>,
        time_sync: TimeSync<S>,
        monotonic: M,
        utc_offset: UtcOffset,
    ) -> Self {
        Self {
            hardware,
            time_sync,
            monotonic,
            utc_offset,
            state: ClockState::Connecting,
            sync_state: SyncState::new(),
            last_rendered: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ClockState {
        self.state
    }

    #[must_use]
    pub const fn sync_state(&self) -> &SyncState {
        &self.sync_state
    }

    #[must_use]
    pub const fn last_rendered(&self) -> Option<WallTime> {
        self.last_rendered
    }

    /// Run the whole state machine. Returns only on a fatal error.
    ///
    /// # Errors
    ///
    /// Returns hardware I/O errors, and any error `association` resolves to.
    pub async fn run<F, D>(&mut self, association: F, mut delay: D) -> Result<Infallible>
    where
        F: Future<Output = Result<()>>,
        D: DelayNs,
    {
        self.connect(association).await?;
        self.sync(&mut delay).await?;
        self.keep_time(&mut delay).await
    }

    /// `Connecting`: show "Conn" and wait for the network association to finish. The
    /// association does its own retrying.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisplayIo`] or whatever `association` fails with.
    pub async fn connect<F>(&mut self, association: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        self.enter(ClockState::Connecting);
        self.hardware.display.write_frame(&DisplayFrame::CONNECTING)?;
        association.await
    }

    /// `Syncing`: show "SYnc" and fetch the time, retrying every
    /// [`INITIAL_SYNC_RETRY_DELAY`] until it works, then set the RTC. Ends in `Running`.
    ///
    /// # Errors
    ///
    /// Returns hardware I/O errors. Network failures are retried, never returned.
    pub async fn sync<D: DelayNs>(&mut self, delay: &mut D) -> Result<()> {
        self.enter(ClockState::Syncing);
        self.hardware.display.write_frame(&DisplayFrame::SYNCING)?;
        while !self.resync().await? {
            delay
                .delay_ms(millis_u32(INITIAL_SYNC_RETRY_DELAY.as_millis()))
                .await;
        }
        self.last_rendered = None;
        self.enter(ClockState::Running);
        Ok(())
    }

    /// `Running`: tick every [`POLL_INTERVAL`] and re-sync whenever one is due. Ticks keep
    /// going while a re-sync is in flight, so a slow or hung fetch never holds the display.
    ///
    /// # Errors
    ///
    /// Returns hardware I/O errors. A failed re-sync is not an error.
    pub async fn keep_time<D: DelayNs>(&mut self, delay: &mut D) -> Result<Infallible> {
        loop {
            if self.sync_state.is_due(self.monotonic.now()) {
                self.resync_while_rendering(delay).await?;
            }
            self.tick()?;
            delay.delay_ms(poll_interval_ms()).await;
        }
    }

    /// Render the RTC time if its second changed since the last render.
    ///
    /// # Errors
    ///
    /// Returns hardware I/O errors.
    pub fn tick(&mut self) -> Result<Tick> {
        self.hardware.render(&mut self.last_rendered)
    }

    /// One acquisition attempt with nothing else going on. `Ok(true)` once the RTC holds the
    /// new time, `Ok(false)` if the attempt failed and the RTC was left alone.
    async fn resync(&mut self) -> Result<bool> {
        let now = self.monotonic.now();
        let acquired = self
            .time_sync
            .acquire(&mut self.sync_state, now, self.utc_offset)
            .await;
        self.apply(acquired)
    }

    /// One acquisition attempt, ticking every poll interval until it finishes.
    async fn resync_while_rendering<D: DelayNs>(&mut self, delay: &mut D) -> Result<bool> {
        let now = self.monotonic.now();
        let acquisition = self
            .time_sync
            .acquire(&mut self.sync_state, now, self.utc_offset);
        let rendering = self
            .hardware
            .render_until_fault(&mut self.last_rendered, delay);
        let outcome = select(acquisition, rendering).await;
        match outcome {
            Either::First(acquired) => self.apply(acquired),
            Either::Second(err) => Err(err),
        }
    }

    fn apply(&mut self, acquired: Result<WallTime>) -> Result<bool> {
        match acquired {
            Ok(wall_time) => {
                self.hardware.rtc.set(wall_time)?;
                #[cfg(feature = "defmt")]
                info!("RTC set to {:?}", wall_time);
                Ok(true)
            }
            Err(Error::NetworkTimeUnavailable(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn enter(&mut self, state: ClockState) {
        #[cfg(feature = "defmt")]
        info!("Clock state {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

fn poll_interval_ms() -> u32 {
    millis_u32(POLL_INTERVAL.as_millis())
}

fn millis_u32(millis: u64) -> u32 {
    u32::try_from(millis).unwrap_or(u32::MAX)
}
