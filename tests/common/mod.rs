//! Shared test infrastructure for led-clock integration tests

#![allow(dead_code, reason = "items used across multiple test files; Rust analyzes per-file")]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embassy_time::{Duration, Instant};
use embedded_hal::digital::{self, InputPin};
use embedded_hal::i2c::{self, I2c};
use embedded_hal::spi::{self, SpiDevice};
use embedded_hal_async::delay::DelayNs;
use led_clock::Monotonic;
use led_clock::time_sync::TimeSource;
use led_clock::unix_seconds::UnixSeconds;

/// 2023-11-14 00:00:00 UTC.
pub const MIDNIGHT_UNIX: i64 = 1_699_920_000;

/// Unix time at the given time of day on [`MIDNIGHT_UNIX`]'s date.
pub fn unix_at(hour: i64, minute: i64, second: i64) -> UnixSeconds {
    UnixSeconds(MIDNIGHT_UNIX + hour * 3600 + minute * 60 + second)
}

// ============================================================================
// Mock DS1307
// ============================================================================

#[derive(Default)]
struct Ds1307State {
    registers: [u8; 8],
    pointer: usize,
    writes: usize,
    reads: usize,
    read_budget: Option<usize>,
    fail_reads: bool,
    fail_writes: bool,
}

/// DS1307 register file behind an I2C bus. Clones share the same chip, so a test can keep
/// a handle after moving one into the code under test.
#[derive(Clone, Default)]
pub struct MockDs1307 {
    state: Rc<RefCell<Ds1307State>>,
}

impl MockDs1307 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chip preloaded with raw (BCD) seconds, minutes and hours registers.
    pub fn with_raw(seconds: u8, minutes: u8, hours: u8) -> Self {
        let rtc = Self::new();
        rtc.set_raw(seconds, minutes, hours);
        rtc
    }

    pub fn set_raw(&self, seconds: u8, minutes: u8, hours: u8) {
        let mut state = self.state.borrow_mut();
        state.registers[0] = seconds;
        state.registers[1] = minutes;
        state.registers[2] = hours;
    }

    /// Raw seconds, minutes and hours registers.
    pub fn raw(&self) -> [u8; 3] {
        let state = self.state.borrow();
        [state.registers[0], state.registers[1], state.registers[2]]
    }

    /// Number of write transfers that reached the chip.
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    /// Let `reads` more read transfers succeed, then fail every read.
    pub fn fail_reads_after(&self, reads: usize) {
        let mut state = self.state.borrow_mut();
        state.read_budget = Some(state.reads + reads);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }
}

impl i2c::ErrorType for MockDs1307 {
    type Error = i2c::ErrorKind;
}

impl I2c for MockDs1307 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        assert_eq!(address, led_clock::rtc::DS1307_ADDRESS);
        let mut state = self.state.borrow_mut();
        for operation in operations {
            match operation {
                i2c::Operation::Write(bytes) => {
                    if state.fail_writes {
                        return Err(i2c::ErrorKind::NoAcknowledge(
                            i2c::NoAcknowledgeSource::Address,
                        ));
                    }
                    state.writes += 1;
                    let Some((&pointer, values)) = bytes.split_first() else {
                        continue;
                    };
                    state.pointer = usize::from(pointer);
                    for &value in values {
                        let pointer = state.pointer;
                        state.registers[pointer] = value;
                        state.pointer = (pointer + 1) % 8;
                    }
                }
                i2c::Operation::Read(buffer) => {
                    let over_budget = state.read_budget.is_some_and(|budget| state.reads >= budget);
                    if state.fail_reads || over_budget {
                        return Err(i2c::ErrorKind::Bus);
                    }
                    state.reads += 1;
                    for byte in buffer.iter_mut() {
                        let pointer = state.pointer;
                        *byte = state.registers[pointer];
                        state.pointer = (pointer + 1) % 8;
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Mock SPI device
// ============================================================================

/// SPI device that records every chip-select-framed write.
#[derive(Clone, Default)]
pub struct MockSpi {
    transfers: Rc<RefCell<Vec<Vec<u8>>>>,
    fail: Rc<Cell<bool>>,
}

impl MockSpi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> Vec<Vec<u8>> {
        self.transfers.borrow().clone()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.borrow().len()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl spi::ErrorType for MockSpi {
    type Error = spi::ErrorKind;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [spi::Operation<'_, u8>]) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(spi::ErrorKind::Other);
        }
        let mut transfer = Vec::new();
        for operation in operations {
            match operation {
                spi::Operation::Write(bytes) => transfer.extend_from_slice(bytes),
                other => panic!("unexpected SPI operation {other:?}"),
            }
        }
        self.transfers.borrow_mut().push(transfer);
        Ok(())
    }
}

// ============================================================================
// Mock switch
// ============================================================================

/// Switch to ground on a pulled-up pin: closed reads low.
#[derive(Clone, Default)]
pub struct MockSwitch {
    closed: Rc<Cell<bool>>,
    fail: Rc<Cell<bool>>,
}

impl MockSwitch {
    pub fn new(closed: bool) -> Self {
        let switch = Self::default();
        switch.set_closed(closed);
        switch
    }

    pub fn set_closed(&self, closed: bool) {
        self.closed.set(closed);
    }

    pub fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl digital::ErrorType for MockSwitch {
    type Error = digital::ErrorKind;
}

impl InputPin for MockSwitch {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        if self.fail.get() {
            Err(digital::ErrorKind::Other)
        } else {
            Ok(self.closed.get())
        }
    }
}

// ============================================================================
// Mock time source, monotonic clock and delay
// ============================================================================

/// Time source that plays back scripted replies, then fails (or hangs, see
/// [`MockTimeSource::hang_when_empty`]).
#[derive(Clone, Default)]
pub struct MockTimeSource {
    replies: Rc<RefCell<VecDeque<Result<UnixSeconds, &'static str>>>>,
    calls: Rc<Cell<usize>>,
    hang_when_empty: Rc<Cell<bool>>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, unix_seconds: UnixSeconds) {
        self.replies.borrow_mut().push_back(Ok(unix_seconds));
    }

    pub fn push_err(&self, reason: &'static str) {
        self.replies.borrow_mut().push_back(Err(reason));
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Once the scripted replies run out, fetches never complete, like a request whose
    /// reply never arrives.
    pub fn hang_when_empty(&self) {
        self.hang_when_empty.set(true);
    }
}

impl TimeSource for MockTimeSource {
    async fn fetch_unix_seconds(&mut self) -> Result<UnixSeconds, &'static str> {
        self.calls.set(self.calls.get() + 1);
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply,
            None if self.hang_when_empty.get() => core::future::pending().await,
            None => Err("no scripted reply"),
        }
    }
}

/// Manually advanced monotonic clock.
pub struct MockMonotonic {
    now: Cell<Instant>,
}

impl MockMonotonic {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::from_secs(1_000)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Monotonic for MockMonotonic {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Delay that returns at once and adds up how long it was asked to wait.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> Duration {
        Duration::from_micros(self.total_ns / 1_000)
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
        self.calls += 1;
    }
}

/// Delay that returns at once after handing the requested wait to `on_wait`, so a test can
/// move the world on between polls.
pub struct SteppingDelay<F: FnMut(Duration)> {
    on_wait: F,
    pub calls: usize,
}

impl<F: FnMut(Duration)> SteppingDelay<F> {
    pub fn new(on_wait: F) -> Self {
        Self { on_wait, calls: 0 }
    }
}

impl<F: FnMut(Duration)> DelayNs for SteppingDelay<F> {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        (self.on_wait)(Duration::from_nanos(u64::from(ns)));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        (self.on_wait)(Duration::from_millis(u64::from(ms)));
    }
}
