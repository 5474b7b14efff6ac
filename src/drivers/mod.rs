//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod button;
pub mod hw_init;
pub mod indicator;
pub mod oled;
pub mod servo;
pub mod watchdog;

/// Yield the CPU for `ms` milliseconds.  The control loop's only
/// blocking call — everything else is a non-blocking step.
#[cfg(target_os = "espidf")]
pub fn sleep_ms(ms: u32) {
    esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
}

/// Host equivalent for simulation runs.
#[cfg(not(target_os = "espidf"))]
pub fn sleep_ms(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
}
