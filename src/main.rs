//! VolKnob Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  KnobInput      SonosTransport   OledDisplay    LogEventSink   │
//! │  (InputPort)    (SpeakerPort)    (DisplayPort)  (EventSink)    │
//! │  WifiAdapter    Esp32Time        Watchdog                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · VolumeState · MenuCursor                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Encoder ISR ──▶ single atomic tick slot ──▶ control loop      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use volknob::adapters::display::OledDisplay;
use volknob::adapters::knob::KnobInput;
use volknob::adapters::log_sink::LogEventSink;
use volknob::adapters::sonos::SonosTransport;
use volknob::adapters::time::Esp32TimeAdapter;
use volknob::adapters::wifi::{ConnectivityPort, StationCredentials, WifiAdapter};
use volknob::app::ports::SpeakerPort;
use volknob::app::service::AppService;
use volknob::config::KnobConfig;
use volknob::drivers::encoder::ENCODER;
use volknob::drivers::hw_init;
use volknob::drivers::watchdog::Watchdog;
use volknob::error::Error;
use volknob::pins;
use volknob::volume::OutputRole;

const SPLASH_TEXT: &str = "Sonos";
const SPLASH_DURATION: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  VolKnob v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = KnobConfig::load().map_err(Error::from)?;
    info!(
        "Config: {} @ {}:{} (primary), {} @ {}:{} (secondary)",
        config.primary.name,
        config.primary.host,
        config.primary.port,
        config.secondary.name,
        config.secondary.host,
        config.secondary.port
    );
    ENCODER.set_refractory_ms(config.encoder_refractory_ms);

    // ── 3. GPIO inputs + encoder ISR ──────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    hw_init::init_isr_service().map_err(Error::from)?;

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();

    // ── 4. Display + splash ───────────────────────────────────
    // SAFETY: pins.rs assigns these GPIOs to the I²C bus only.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::OLED_I2C_FREQ_HZ));
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_config)?;
    let mut display = OledDisplay::new(i2c, pins::OLED_I2C_ADDR, &config.secondary.name)
        .map_err(Error::from)?;
    display.splash(SPLASH_TEXT);
    std::thread::sleep(SPLASH_DURATION);

    // ── 5. WiFi (blocks until associated) ─────────────────────
    let credentials = StationCredentials::from_config(&config).map_err(Error::from)?;
    let mut wifi = WifiAdapter::new(peripherals.modem, sys_loop, nvs, credentials)?;
    wifi.connect_blocking().map_err(Error::from)?;

    // ── 6. Initial volume + app start ─────────────────────────
    let mut speakers = SonosTransport::new(&config);
    let initial_volume = match speakers.get_volume(OutputRole::Primary) {
        Ok(v) => v,
        Err(e) => {
            warn!("Initial volume read failed ({}), starting at 0", e);
            0
        }
    };
    info!("Initial volume: {}", initial_volume);

    let time = Esp32TimeAdapter::new();
    let mut knob = KnobInput::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(&config, initial_volume);
    app.start(time.uptime_ms(), &mut display, &mut sink);

    // ── 7. Control loop (never returns) ───────────────────────
    let watchdog = Watchdog::new();
    let interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));
    info!("Entering control loop ({} ms)", config.control_loop_interval_ms);

    loop {
        let now_ms = time.uptime_ms();
        app.cycle(now_ms, &mut knob, &mut speakers, &mut display, &mut sink);
        wifi.poll(now_ms);
        watchdog.feed();
        std::thread::sleep(interval);
    }
}
