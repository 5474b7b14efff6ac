//! ISR side of the user button.
//!
//! The GPIO ISR fires on the rising edge and stamps the static
//! [`PressLatch`] — a single conditional atomic store, nothing else runs
//! in interrupt context.  All classification happens in the control loop
//! via [`PressClassifier`](crate::control::press::PressClassifier).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the line level comes from the configured button GPIO.
//! On host/test: the level is injectable via [`sim_set_pressed`].

use crate::control::press::PressLatch;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

/// The one latch shared between the button ISR and the control loop.
pub static BUTTON_LATCH: PressLatch = PressLatch::new();

#[cfg(not(target_os = "espidf"))]
static SIM_PRESSED: AtomicBool = AtomicBool::new(false);

/// Inject the simulated button level (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pressed(pressed: bool) {
    SIM_PRESSED.store(pressed, Ordering::Relaxed);
}

/// ISR handler — registered on the button GPIO rising edge.
/// Safe to call from interrupt context (lock-free conditional store).
pub fn button_isr_handler(now_ms: u32) {
    BUTTON_LATCH.record(now_ms);
}

/// Current physical button level (`true` = held down).
#[cfg(target_os = "espidf")]
pub fn is_pressed() -> bool {
    crate::drivers::hw_init::gpio_read(crate::pins::BUTTON_GPIO)
}

/// Current simulated button level.
#[cfg(not(target_os = "espidf"))]
pub fn is_pressed() -> bool {
    SIM_PRESSED.load(Ordering::Relaxed)
}
