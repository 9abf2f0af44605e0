//! WiFi wall clock firmware for a Raspberry Pi Pico W.
//!
//! Wiring:
//! - DS1307 RTC on I2C0: SDA = GP4, SCL = GP5
//! - MC14489B LED driver on SPI1: CLK = GP10, MOSI = GP11, chip select = GP13
//! - Option switches to ground: GP2 = summer time, GP3 = 12-hour mode
//!
//! Set `WIFI_SSID`, `WIFI_PASS` and optionally `UTC_OFFSET_MINUTES` in the environment or a
//! `.env` file before building.

#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::{i2c, spi};
use embassy_sync::once_lock::OnceLock;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use led_clock::config::{WifiCredentials, utc_offset_from_build_env};
use led_clock::controller::Uptime;
use led_clock::led_driver::Mc14489;
use led_clock::rtc::RealTimeClock;
use led_clock::time_sync::{NtpTimeSource, TimeSync};
use led_clock::wifi::{self, WifiPeripherals};
use led_clock::{ClockController, ClockHardware, OptionBindings, Result};
use panic_probe as _;

const DISPLAY_SPI_FREQUENCY: u32 = 1_000_000;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    core::panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    info!("Starting WiFi LED clock");
    // Configuration problems should show up before any hardware is touched.
    let credentials = WifiCredentials::from_build_env()?;
    let utc_offset = utc_offset_from_build_env()?;
    info!("UTC offset: {} s", utc_offset.whole_seconds());

    let p = embassy_rp::init(Default::default());

    let i2c = i2c::I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let mut rtc = RealTimeClock::new(i2c);
    rtc.start()?;

    let mut spi_config = spi::Config::default();
    spi_config.frequency = DISPLAY_SPI_FREQUENCY;
    let spi_bus = spi::Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, spi_config);
    let chip_select = Output::new(p.PIN_13, Level::High);
    let Ok(spi) = ExclusiveDevice::new_no_delay(spi_bus, chip_select);
    let display = Mc14489::new(spi);

    let options = OptionBindings::two_switch(
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
    );

    static STACK: OnceLock<Stack<'static>> = OnceLock::new();
    let wifi = WifiPeripherals {
        pin_23: p.PIN_23,  // CYW43 power
        pin_25: p.PIN_25,  // CYW43 chip select
        pio0: p.PIO0,      // CYW43 PIO interface
        pin_24: p.PIN_24,  // CYW43 data
        pin_29: p.PIN_29,  // CYW43 clock
        dma_ch0: p.DMA_CH0, // CYW43 DMA channel
    };

    let mut controller = ClockController::new(
        ClockHardware {
            rtc,
            display,
            options,
        },
        TimeSync::new(NtpTimeSource::new(&STACK)),
        Uptime,
        utc_offset,
    );
    controller
        .run(wifi::join(wifi, credentials, &STACK, spawner), Delay)
        .await
}
