//! WiFi client bring-up for the Pico W (CYW43439 radio).
//!
//! [`join`] powers the radio, starts the network stack, joins the configured network
//! (retrying until it succeeds) and waits for a DHCP lease. When it returns, the stack
//! has been published to the given [`OnceLock`], which is where
//! [`NtpTimeSource`](crate::time_sync::NtpTimeSource) picks it up.
//!
//! ```ignore
//! static STACK: OnceLock<Stack<'static>> = OnceLock::new();
//! let wifi = WifiPeripherals { pin_23: p.PIN_23, /* ... */ };
//! wifi::join(wifi, credentials, &STACK, spawner).await?;
//! ```

#![allow(clippy::future_not_send, reason = "single-threaded")]

use cyw43::JoinOptions;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::{Peri, bind_interrupts};
use embassy_sync::once_lock::OnceLock;
use embassy_time::{Duration, Timer, with_timeout};
use static_cell::StaticCell;

use crate::Result;
use crate::config::{WIFI_JOIN_RETRY_DELAY, WifiCredentials};

/// Give up on a single join attempt after this long and try again.
const JOIN_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Fixed seed for the network stack's randomness (ports, DHCP transaction ids).
const NET_SEED: u64 = 0x7c8f_3a2e_9d14_6b5a;

/// The Pico W pins and peripherals wired to the radio.
pub struct WifiPeripherals {
    /// Radio power (GPIO 23).
    pub pin_23: Peri<'static, PIN_23>,
    /// Radio chip select (GPIO 25).
    pub pin_25: Peri<'static, PIN_25>,
    pub pio0: Peri<'static, PIO0>,
    /// Radio data (GPIO 24).
    pub pin_24: Peri<'static, PIN_24>,
    /// Radio clock (GPIO 29).
    pub pin_29: Peri<'static, PIN_29>,
    pub dma_ch0: Peri<'static, DMA_CH0>,
}

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// Bring the network up and publish the stack to `stack_cell`.
///
/// Join failures are retried every [`WIFI_JOIN_RETRY_DELAY`] indefinitely, so this only
/// returns once there is an IP address.
///
/// # Errors
///
/// Returns [`Error::TaskSpawn`](crate::Error::TaskSpawn) if the radio or network task
/// cannot be started.
pub async fn join(
    wifi: WifiPeripherals,
    credentials: WifiCredentials,
    stack_cell: &'static OnceLock<Stack<'static>>,
    spawner: Spawner,
) -> Result<()> {
    let WifiPeripherals {
        pin_23,
        pin_25,
        pio0,
        pin_24,
        pin_29,
        dma_ch0,
    } = wifi;

    info!("WiFi initializing");
    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(pin_23, Level::Low);
    let cs = Output::new(pin_25, Level::High);
    let mut pio = Pio::new(pio0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        pin_24,
        pin_29,
        dma_ch0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(wifi_task(runner)?);

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    static RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::<5>::new()),
        NET_SEED,
    );
    spawner.spawn(net_task(runner)?);

    info!("Connecting to WiFi: {}", credentials.ssid);
    loop {
        let options = JoinOptions::new(credentials.password.as_bytes());
        match with_timeout(
            JOIN_ATTEMPT_TIMEOUT,
            control.join(credentials.ssid.as_str(), options),
        )
        .await
        {
            Ok(Ok(())) => break,
            Ok(Err(err)) => warn!("Join failed: {}", err.status),
            Err(_) => warn!("Join timed out"),
        }
        Timer::after(WIFI_JOIN_RETRY_DELAY).await;
    }

    info!("WiFi connected! Waiting for DHCP...");
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("IP Address: {}", config.address);
    }

    if stack_cell.init(stack).is_err() {
        warn!("Network stack was already published");
    }
    Ok(())
}

// ============================================================================
// WiFi Tasks
// ============================================================================

#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}
