//! Greenhouse Controller Firmware — Main Entry Point
//!
//! One cooperative control loop plus a single interrupt context (the
//! button edge latch).  No event queue, no executor: every subsystem is
//! a non-blocking step of the loop, and the only cross-context state is
//! the press latch's one atomic word.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  HardwareAdapter           MqttLink          WifiAdapter      │
//! │  (Sensor+Actuator+Display) (MessagePort)     (transport)      │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ────────────────────    │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │            ControlService (pure logic)                  │  │
//! │  │  press · mode · automatic rule · sweep · blink · telem  │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! │                                                               │
//! │  ISR: button edge ──▶ BUTTON_LATCH (compare-and-set-if-absent)│
//! └───────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::i2c::{config::Config as I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use greenhouse::adapters::hardware::HardwareAdapter;
use greenhouse::adapters::mqtt::MqttLink;
use greenhouse::adapters::time::MonotonicClock;
use greenhouse::adapters::wifi::WifiAdapter;
use greenhouse::app::service::ControlService;
use greenhouse::config::SystemConfig;
use greenhouse::drivers::button::BUTTON_LATCH;
use greenhouse::drivers::indicator::IndicatorLed;
use greenhouse::drivers::oled::OledDisplay;
use greenhouse::drivers::servo::VentServo;
use greenhouse::drivers::watchdog::Watchdog;
use greenhouse::drivers::{self, hw_init};
use greenhouse::pins;
use greenhouse::sensors::dht22::Dht22;
use greenhouse::sensors::light::LightSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("greenhouse v{} starting", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();

    // ── 2. Peripheral init ────────────────────────────────────
    hw_init::init_peripherals().context("peripheral init")?;
    hw_init::init_isr_service().context("ISR service init")?;
    let watchdog = Watchdog::new(10_000);

    let peripherals = Peripherals::take().context("Peripherals::take")?;
    let sysloop = EspSystemEventLoop::take().context("event loop")?;
    let nvs = EspDefaultNvsPartition::take().ok();

    // ── 3. Transport bootstrap — the only fatal failure path ──
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs)?;
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)?;
    wifi.connect().context("WiFi station connect")?;

    let mut link = MqttLink::connect(&config).context("MQTT connect")?;

    // ── 4. Construct adapters ─────────────────────────────────
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio5, // SDA (pins::I2C_SDA_GPIO)
        peripherals.pins.gpio4, // SCL (pins::I2C_SCL_GPIO)
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )
    .context("I2C driver")?;

    let mut hw = HardwareAdapter::new(
        Dht22::new(pins::DHT_GPIO),
        LightSensor::new(pins::LDR_ADC_GPIO),
        VentServo::new(),
        IndicatorLed::new(),
        OledDisplay::new(i2c),
    );

    // ── 5. Control service + loop ─────────────────────────────
    let clock = MonotonicClock::new();
    let mut service = ControlService::new(config.clone());

    info!("system ready, entering control loop");

    loop {
        let now_ms = clock.now_ms();

        let pace = service.tick(now_ms, &BUTTON_LATCH, &mut hw, &mut link);

        // Link supervision + watchdog are loop housekeeping, not part of
        // the control cycle proper.
        wifi.poll(now_ms);
        watchdog.feed();

        drivers::sleep_ms(pace.delay_ms(&config));
    }
}
