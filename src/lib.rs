//! A WiFi wall clock: network time into a DS1307 real-time clock, shown on four
//! 7-segment digits driven by an MC14489B.
//!
//! The pipeline is hardware-agnostic. Chips are reached through `embedded-hal` traits and
//! network time through [`TimeSource`](time_sync::TimeSource), so everything except the
//! firmware entry point (`src/main.rs`) and the `wifi` module builds and tests on the host.
//!
//! See [`ClockController`](controller::ClockController) for the top-level state machine.
#![cfg_attr(not(test), no_std)]

pub mod bcd;
pub mod config;
pub mod controller;
pub mod display;
mod error;
pub mod led_driver;
pub mod options;
pub mod rtc;
pub mod time_sync;
pub mod unix_seconds;
pub mod wall_time;
#[cfg(feature = "wifi")]
pub mod wifi;

// Re-export commonly used items
pub use controller::{ClockController, ClockHardware, ClockState, Monotonic, Tick};
pub use display::DisplayFrame;
pub use error::{Error, Result};
pub use options::{OptionBindings, OptionSet, OptionSource};
pub use wall_time::WallTime;
